use crate::error::Result;
use crate::image::{
    blue, clamp_i8, green, pack_argb, red, Gray32Image, Gray8Image, Image, Pixels, RgbChannel,
    RgbImage,
};
use crate::pipeline::Transform;

/// RGB to gray by averaging the three signed channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbAvgGray;

impl Transform for RgbAvgGray {
    const NAME: &'static str = "RgbAvgGray";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let rgb = image.as_rgb(Self::NAME)?;
        let gray: Gray8Image =
            rgb.map(|&w| ((red(w) as i32 + green(w) as i32 + blue(w) as i32) / 3) as i8);
        image.replace_pixels(Pixels::Gray8(gray))
    }
}

/// RGB to gray by selecting one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbSelectGray {
    channel: RgbChannel,
}

impl RgbSelectGray {
    pub fn new(channel: RgbChannel) -> Self {
        Self { channel }
    }
}

impl Transform for RgbSelectGray {
    const NAME: &'static str = "RgbSelectGray";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let channel = self.channel;
        let gray: Gray8Image = image.as_rgb(Self::NAME)?.map(|&w| channel.extract(w));
        image.replace_pixels(Pixels::Gray8(gray))
    }
}

/// Gray to RGB with all three channels set to the gray sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Rgb;

impl Transform for Gray8Rgb {
    const NAME: &'static str = "Gray8Rgb";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let rgb: RgbImage = image.as_gray8(Self::NAME)?.map(|&v| pack_argb(v, v, v));
        image.replace_pixels(Pixels::Rgb(rgb))
    }
}

/// Widens gray samples to 32 bits without rescaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Gray32;

impl Transform for Gray8Gray32 {
    const NAME: &'static str = "Gray8Gray32";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let wide: Gray32Image = image.as_gray8(Self::NAME)?.map(|&v| v as i32);
        image.replace_pixels(Pixels::Gray32(wide))
    }
}

/// Rescales a 32-bit image so its minimum maps to -128 and maximum to 127.
///
/// A constant image maps to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray32Gray8;

impl Transform for Gray32Gray8 {
    const NAME: &'static str = "Gray32Gray8";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray32(Self::NAME)?;
        let (min, max) = {
            let pixels = plane.read();
            let min = pixels.iter().copied().min().unwrap_or(0) as i64;
            let max = pixels.iter().copied().max().unwrap_or(0) as i64;
            (min, max)
        };
        let range = max - min;
        let gray: Gray8Image = plane.map(|&v| {
            if range == 0 {
                0
            } else {
                ((v as i64 - min) * 255 / range - 128) as i8
            }
        });
        image.replace_pixels(Pixels::Gray8(gray))
    }
}

/// Clamps 16-bit samples into the 8-bit range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray16Gray8;

impl Transform for Gray16Gray8 {
    const NAME: &'static str = "Gray16Gray8";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let gray: Gray8Image = image.as_gray16(Self::NAME)?.map(|&v| clamp_i8(v as i32));
        image.replace_pixels(Pixels::Gray8(gray))
    }
}
