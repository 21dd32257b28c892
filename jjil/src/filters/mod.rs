//! Per-pixel, histogram, convolution and format-conversion stages plus the
//! binary joins used by ladders.

mod convert;
mod convolve;
mod histogram;
mod integral;
mod joins;
mod pointwise;
mod threshold;


pub use convert::{Gray16Gray8, Gray32Gray8, Gray8Gray32, Gray8Rgb, RgbAvgGray, RgbSelectGray};
pub use convolve::{Gray8Convolve, Gray8GaussSmooth};
pub use histogram::{histogram, Gray8HistEq, Gray8Histogram};
pub use integral::{integral_image, Gray8IntegralImage, Gray8Statistics, Statistics};
pub use joins::{Gray32Divide, Gray8Add, Gray8AttachMask, Gray8Max, Gray8Min, Gray8Subtract};
pub use pointwise::{Gray8Lookup, Gray8Mpy, Gray8Negate};
pub use threshold::{otsu_threshold, Gray8OtsuThreshold, Gray8Threshold};

use crate::error::Result;
use crate::image::Image;

/// Rewrites every sample of a gray image in place.
pub(crate) fn map_gray8_in_place<F>(image: &Image, stage: &'static str, f: F) -> Result<()>
where
    F: Fn(i8) -> i8,
{
    let plane = image.as_gray8(stage)?;
    for v in plane.write().iter_mut() {
        *v = f(*v);
    }
    Ok(())
}
