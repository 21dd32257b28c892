//! Haar-cascade classification and multi-scale detection.

mod cascade;
mod detector;

#[cfg(test)]
mod tests;

pub use cascade::{Classifier, HaarCascade, HaarFeature, HaarRect, HaarStage};
pub use detector::{Gray8DetectHaarMultiScale, HaarDetectorConfig, MAX_SCALE, SCALE_UNIT};
