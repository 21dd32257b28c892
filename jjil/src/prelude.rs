//! Commonly used types and traits.
//!
//! ```rust,ignore
//! use jjil::prelude::*;
//! ```

pub use crate::{Error, Result};

// Image model
pub use crate::image::{
    Complex32Image, Gray16Image, Gray32Image, Gray8Image, Image, PixelFormat, Pixels, Plane,
    Rect, RgbImage, Size, MASK_ACTIVE, MASK_MASKED,
};

// Pipeline
pub use crate::pipeline::{
    CopyStage, Join, Ladder, PipelineConfig, PipelineStage, Sequence, Stage, StageConfig,
    Transform,
};

// Stages
pub use crate::components::Gray8ConnComp;
pub use crate::fft::{Complex32Deconvolve, Complex32IFft, Complex32Magnitude, Gray8Fft};
pub use crate::filters::{
    Gray8Convolve, Gray8GaussSmooth, Gray8HistEq, Gray8OtsuThreshold, Gray8Threshold,
    RgbAvgGray,
};
pub use crate::geometry::{Gray8Crop, Gray8RectStretch, Gray8Shrink, LinefitHough, MaskPolygon};
pub use crate::haar::{Classifier, Gray8DetectHaarMultiScale, HaarCascade, HaarDetectorConfig};
