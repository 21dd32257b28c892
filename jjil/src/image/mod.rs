//! Image data model.
//!
//! An [`Image`] is one of a closed set of pixel planes plus optional
//! metadata: the offset it was cut from inside a larger parent image, and a
//! mask of the same size marking which pixels are active.

mod interchange;
mod plane;
mod rect;
mod rgb;


use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::Complex;

pub use plane::Plane;
pub use rect::{Rect, Size};
pub use rgb::{blue, green, pack_argb, red, RgbChannel, ALPHA_OPAQUE};

pub type Gray8Image = Plane<i8>;
pub type Gray16Image = Plane<i16>;
pub type Gray32Image = Plane<i32>;
pub type Complex32Image = Plane<Complex>;
/// Packed ARGB words, alpha always 0xFF.
pub type RgbImage = Plane<u32>;

/// Mask value of an active (unmasked) pixel. Any other value is masked.
pub const MASK_ACTIVE: i8 = i8::MIN;
/// Canonical value written for masked pixels.
pub const MASK_MASKED: i8 = i8::MAX;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum PixelFormat {
    Gray8,
    Gray16,
    Gray32,
    Complex32,
    Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    Gray8(Gray8Image),
    Gray16(Gray16Image),
    Gray32(Gray32Image),
    Complex32(Complex32Image),
    Rgb(RgbImage),
}

impl Pixels {
    pub fn format(&self) -> PixelFormat {
        match self {
            Pixels::Gray8(_) => PixelFormat::Gray8,
            Pixels::Gray16(_) => PixelFormat::Gray16,
            Pixels::Gray32(_) => PixelFormat::Gray32,
            Pixels::Complex32(_) => PixelFormat::Complex32,
            Pixels::Rgb(_) => PixelFormat::Rgb,
        }
    }

    pub fn size(&self) -> Size {
        match self {
            Pixels::Gray8(p) => p.size(),
            Pixels::Gray16(p) => p.size(),
            Pixels::Gray32(p) => p.size(),
            Pixels::Complex32(p) => p.size(),
            Pixels::Rgb(p) => p.size(),
        }
    }

    fn share(&self) -> Pixels {
        match self {
            Pixels::Gray8(p) => Pixels::Gray8(p.share()),
            Pixels::Gray16(p) => Pixels::Gray16(p.share()),
            Pixels::Gray32(p) => Pixels::Gray32(p.share()),
            Pixels::Complex32(p) => Pixels::Complex32(p.share()),
            Pixels::Rgb(p) => Pixels::Rgb(p.share()),
        }
    }
}

/// A pixel plane with optional parent offset and activity mask.
///
/// `Clone` deep-copies pixels and mask; [`Image::share`] aliases them.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Pixels,
    offset: Option<IVec2>,
    mask: Option<Gray8Image>,
}

macro_rules! image_variant {
    ($variant:ident, $plane:ty, $as_fn:ident, $into_fn:ident) => {
        impl From<$plane> for Image {
            fn from(plane: $plane) -> Self {
                Image::new(Pixels::$variant(plane))
            }
        }

        impl Image {
            /// Borrows the plane, failing with [`Error::FormatMismatch`] for other formats.
            pub fn $as_fn(&self, stage: &'static str) -> Result<&$plane> {
                match &self.pixels {
                    Pixels::$variant(plane) => Ok(plane),
                    other => Err(Error::FormatMismatch {
                        stage,
                        expected: PixelFormat::$variant,
                        found: other.format(),
                    }),
                }
            }

            /// Takes the plane, failing with [`Error::FormatMismatch`] for other formats.
            pub fn $into_fn(self, stage: &'static str) -> Result<$plane> {
                match self.pixels {
                    Pixels::$variant(plane) => Ok(plane),
                    other => Err(Error::FormatMismatch {
                        stage,
                        expected: PixelFormat::$variant,
                        found: other.format(),
                    }),
                }
            }
        }
    };
}

image_variant!(Gray8, Gray8Image, as_gray8, into_gray8);
image_variant!(Gray16, Gray16Image, as_gray16, into_gray16);
image_variant!(Gray32, Gray32Image, as_gray32, into_gray32);
image_variant!(Complex32, Complex32Image, as_complex32, into_complex32);
image_variant!(Rgb, RgbImage, as_rgb, into_rgb);

impl Image {
    pub fn new(pixels: Pixels) -> Self {
        Self {
            pixels,
            offset: None,
            mask: None,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn into_pixels(self) -> Pixels {
        self.pixels
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.pixels.format()
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.pixels.size()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.size().width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.size().height
    }

    /// Position of this image's (0, 0) pixel inside the image it was cut from.
    pub fn offset(&self) -> Option<IVec2> {
        self.offset
    }

    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn mask(&self) -> Option<&Gray8Image> {
        self.mask.as_ref()
    }

    /// Attaches a mask; it must have the image's dimensions.
    pub fn with_mask(mut self, mask: Gray8Image) -> Result<Self> {
        if mask.size() != self.size() {
            return Err(Error::SizeMismatch {
                stage: "Image::with_mask",
                expected: self.size(),
                found: mask.size(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn take_mask(&mut self) -> Option<Gray8Image> {
        self.mask.take()
    }

    /// True when a mask is present and marks `(x, y)` as inactive.
    pub fn is_masked(&self, x: usize, y: usize) -> bool {
        self.mask
            .as_ref()
            .is_some_and(|mask| mask.get(x, y) != MASK_ACTIVE)
    }

    /// Shallow copy sharing both the pixel buffer and the mask buffer.
    pub fn share(&self) -> Self {
        Self {
            pixels: self.pixels.share(),
            offset: self.offset,
            mask: self.mask.as_ref().map(Plane::share),
        }
    }

    /// Keeps offset and mask, swapping in new pixels of the same size.
    pub(crate) fn replace_pixels(self, pixels: Pixels) -> Result<Self> {
        if pixels.size() != self.size() && self.mask.is_some() {
            return Err(Error::SizeMismatch {
                stage: "Image::replace_pixels",
                expected: self.size(),
                found: pixels.size(),
            });
        }
        Ok(Self {
            pixels,
            offset: self.offset,
            mask: self.mask,
        })
    }

    pub fn check_same_size(&self, other: &Image, stage: &'static str) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::SizeMismatch {
                stage,
                expected: self.size(),
                found: other.size(),
            });
        }
        Ok(())
    }
}

impl From<Pixels> for Image {
    fn from(pixels: Pixels) -> Self {
        Image::new(pixels)
    }
}

/// Clamps a wide intermediate into the signed 8-bit sample range.
#[inline]
pub fn clamp_i8(value: i32) -> i8 {
    value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

/// Clamps a wide intermediate into the signed 16-bit sample range.
#[inline]
pub fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
