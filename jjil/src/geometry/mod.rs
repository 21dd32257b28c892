//! Resampling, affine warps, Hough line fitting, sliding windows and polygon masks.

mod affine;
mod hough;
mod polygon;
mod resample;
mod subimage;


pub use affine::{Affine, Gray8QuadMap, Gray8TriangleMap, AFFINE_BITS};
pub use hough::{HoughConfig, Line, LinefitHough};
pub use polygon::MaskPolygon;
pub use resample::{
    crop_plane, resample_nearest, Gray8Crop, Gray8RectStretch, Gray8Shrink, Interpolation,
};
pub use subimage::{Gray8MaskedSubImageGenerator, Gray8SubImageGenerator};
