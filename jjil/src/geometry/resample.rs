use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::{Gray8Image, Image, Plane, Rect, Size};
use crate::pipeline::Transform;

/// Nearest-neighbour resize of any plane.
pub fn resample_nearest<T: Copy>(plane: &Plane<T>, width: usize, height: usize) -> Result<Plane<T>> {
    let (sw, sh) = (plane.width(), plane.height());
    let src = plane.read();
    Plane::from_fn(width, height, |x, y| {
        let sx = x * sw / width;
        let sy = y * sh / height;
        src[sy * sw + sx]
    })
}

/// Copies the pixels of `rect` into a new plane. The rectangle must lie inside.
pub fn crop_plane<T: Copy>(plane: &Plane<T>, rect: Rect, stage: &'static str) -> Result<Plane<T>> {
    let inside = rect.x >= 0
        && rect.y >= 0
        && rect.width > 0
        && rect.height > 0
        && rect.right() < plane.width() as i32
        && rect.bottom() < plane.height() as i32;
    if !inside {
        return Err(Error::parameter(
            stage,
            "rect",
            format!("{} outside {} image", rect, plane.size()),
        ));
    }

    let stride = plane.width();
    let src = plane.read();
    let (ox, oy) = (rect.x as usize, rect.y as usize);
    Plane::from_fn(rect.width as usize, rect.height as usize, |x, y| {
        src[(oy + y) * stride + ox + x]
    })
}

fn check_target(stage: &'static str, width: usize, height: usize) -> Result<Size> {
    if width == 0 || height == 0 {
        return Err(Error::parameter(
            stage,
            "target size",
            Size::new(width, height),
        ));
    }
    Ok(Size::new(width, height))
}

/// Box-averaging reduction to a target size no larger than the input.
///
/// The output carries neither offset nor mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8Shrink {
    target: Size,
}

impl Gray8Shrink {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            target: check_target(Self::NAME, width, height)?,
        })
    }

    pub fn target(&self) -> Size {
        self.target
    }

    pub fn shrink(&self, plane: &Gray8Image) -> Result<Gray8Image> {
        let (sw, sh) = (plane.width(), plane.height());
        let Size { width: tw, height: th } = self.target;
        if !plane.size().contains(self.target) {
            return Err(Error::ImageTooSmall {
                stage: Self::NAME,
                size: plane.size(),
                required: self.target,
            });
        }

        let src = plane.read();
        Gray8Image::from_fn(tw, th, |tx, ty| {
            let (x0, x1) = (tx * sw / tw, (tx + 1) * sw / tw);
            let (y0, y1) = (ty * sh / th, (ty + 1) * sh / th);
            let mut sum = 0i32;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += src[y * sw + x] as i32;
                }
            }
            let n = ((x1 - x0) * (y1 - y0)) as i32;
            // round half away from zero
            let half = n / 2;
            (if sum >= 0 { (sum + half) / n } else { (sum - half) / n }) as i8
        })
    }
}

impl Transform for Gray8Shrink {
    const NAME: &'static str = "Gray8Shrink";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let out = self.shrink(image.as_gray8(Self::NAME)?)?;
        Ok(Image::from(out))
    }
}

/// Sampling used when enlarging.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Enlargement to a target size no smaller than the input.
///
/// The output carries neither offset nor mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8RectStretch {
    target: Size,
    interpolation: Interpolation,
}

/// Fractional bits of bilinear sample positions.
const FRAC_BITS: u32 = 8;
const FRAC_ONE: i64 = 1 << FRAC_BITS;

impl Gray8RectStretch {
    pub fn new(width: usize, height: usize, interpolation: Interpolation) -> Result<Self> {
        Ok(Self {
            target: check_target(Self::NAME, width, height)?,
            interpolation,
        })
    }

    pub fn target(&self) -> Size {
        self.target
    }

    pub fn stretch(&self, plane: &Gray8Image) -> Result<Gray8Image> {
        if !self.target.contains(plane.size()) {
            return Err(Error::parameter(
                Self::NAME,
                "target size",
                format!("{} smaller than input {}", self.target, plane.size()),
            ));
        }
        let Size { width, height } = self.target;
        match self.interpolation {
            Interpolation::Nearest => resample_nearest(plane, width, height),
            Interpolation::Bilinear => bilinear(plane, width, height),
        }
    }
}

/// Source coordinate of a target pixel centre, in `FRAC_BITS` fixed point,
/// clamped to the valid sample range.
fn source_position(t: usize, source: usize, target: usize) -> i64 {
    let centre = ((2 * t + 1) as i64 * source as i64 * FRAC_ONE) / (2 * target as i64);
    (centre - FRAC_ONE / 2).clamp(0, (source as i64 - 1) * FRAC_ONE)
}

fn bilinear(plane: &Gray8Image, width: usize, height: usize) -> Result<Gray8Image> {
    let (sw, sh) = (plane.width(), plane.height());
    let src = plane.read();
    let at = |x: usize, y: usize| src[y * sw + x] as i64;

    Gray8Image::from_fn(width, height, |tx, ty| {
        let fx = source_position(tx, sw, width);
        let fy = source_position(ty, sh, height);
        let (x0, y0) = ((fx >> FRAC_BITS) as usize, (fy >> FRAC_BITS) as usize);
        let (x1, y1) = ((x0 + 1).min(sw - 1), (y0 + 1).min(sh - 1));
        let (ax, ay) = (fx & (FRAC_ONE - 1), fy & (FRAC_ONE - 1));

        let top = at(x0, y0) * (FRAC_ONE - ax) + at(x1, y0) * ax;
        let bottom = at(x0, y1) * (FRAC_ONE - ax) + at(x1, y1) * ax;
        let value = top * (FRAC_ONE - ay) + bottom * ay;
        crate::math::round_shift(value, 2 * FRAC_BITS) as i8
    })
}

impl Transform for Gray8RectStretch {
    const NAME: &'static str = "Gray8RectStretch";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let out = self.stretch(image.as_gray8(Self::NAME)?)?;
        Ok(Image::from(out))
    }
}

/// Cuts a rectangle out of a gray image.
///
/// The mask, if any, is cropped alongside and the offset advances by the
/// rectangle origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8Crop {
    rect: Rect,
}

impl Gray8Crop {
    pub fn new(rect: Rect) -> Result<Self> {
        if rect.x < 0 || rect.y < 0 || rect.width <= 0 || rect.height <= 0 {
            return Err(Error::parameter(Self::NAME, "rect", rect));
        }
        Ok(Self { rect })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

impl Transform for Gray8Crop {
    const NAME: &'static str = "Gray8Crop";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = crop_plane(image.as_gray8(Self::NAME)?, self.rect, Self::NAME)?;
        let offset = image.offset().unwrap_or(IVec2::ZERO) + IVec2::new(self.rect.x, self.rect.y);

        let cropped = Image::from(plane).with_offset(offset);
        match image.mask() {
            Some(mask) => cropped.with_mask(crop_plane(mask, self.rect, Self::NAME)?),
            None => Ok(cropped),
        }
    }
}
