use crate::error::{Error, Result};
use crate::image::{Gray32Image, Gray8Image, Image, Pixels};
use crate::math::isqrt;
use crate::pipeline::Transform;

/// Summed-area table of unsigned samples (`v + 128`).
///
/// Entry `(x, y)` holds the sum over `[0, x] x [0, y]`.
pub fn integral_image(plane: &Gray8Image) -> Result<Gray32Image> {
    let (w, h) = (plane.width(), plane.height());
    if (w * h) as u64 * 255 > i32::MAX as u64 {
        return Err(Error::overflow(format!(
            "integral image of {} exceeds 32 bits",
            plane.size()
        )));
    }

    let src = plane.read();
    let mut sat = vec![0i32; w * h];
    for y in 0..h {
        let mut row_sum = 0i32;
        for x in 0..w {
            row_sum += src[y * w + x] as i32 + 128;
            let above = if y > 0 { sat[(y - 1) * w + x] } else { 0 };
            sat[y * w + x] = row_sum + above;
        }
    }
    drop(src);

    Gray32Image::from_vec(w, h, sat)
}

/// Gray8 to Gray32 summed-area table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8IntegralImage;

impl Transform for Gray8IntegralImage {
    const NAME: &'static str = "Gray8IntegralImage";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let sat = integral_image(image.as_gray8(Self::NAME)?)?;
        image.replace_pixels(Pixels::Gray32(sat))
    }
}

/// Mean and spread of a gray image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Mean signed sample, rounded toward zero.
    pub mean: i32,
    /// Population variance.
    pub variance: i64,
    /// Floor of the square root of the variance.
    pub std_dev: i32,
}

impl Statistics {
    pub fn of(plane: &Gray8Image) -> Result<Self> {
        let n = plane.len() as i64;
        let (sum, sum_sq) = plane
            .read()
            .iter()
            .fold((0i64, 0i64), |(s, sq), &v| (s + v as i64, sq + (v as i64) * (v as i64)));

        let variance = (sum_sq * n - sum * sum) / (n * n);
        Ok(Self {
            mean: (sum / n) as i32,
            variance,
            std_dev: isqrt(variance)? as i32,
        })
    }
}

/// Records [`Statistics`] of each pushed image and passes it through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Statistics {
    stats: Option<Statistics>,
}

impl Gray8Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.stats
    }
}

impl Transform for Gray8Statistics {
    const NAME: &'static str = "Gray8Statistics";

    fn apply(&mut self, image: Image) -> Result<Image> {
        self.stats = Some(Statistics::of(image.as_gray8(Self::NAME)?)?);
        Ok(image)
    }
}
