use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filters::{integral_image, Statistics};
use crate::image::{Gray32Image, Gray8Image, Size};

/// Decides whether a window-sized image contains the target object.
pub trait Classifier {
    fn window_size(&self) -> Size;

    fn classify(&self, window: &Gray8Image) -> Result<bool>;
}

/// Weighted rectangle of a Haar-like feature, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaarRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub weight: i32,
}

impl HaarRect {
    /// Sum of the unsigned samples under the rectangle.
    fn sum(&self, sat: &[i32], stride: usize) -> i64 {
        let at = |x: usize, y: usize| sat[y * stride + x] as i64;
        let (x1, y1) = (self.x + self.width - 1, self.y + self.height - 1);
        let mut total = at(x1, y1);
        if self.x > 0 {
            total -= at(self.x - 1, y1);
        }
        if self.y > 0 {
            total -= at(x1, self.y - 1);
        }
        if self.x > 0 && self.y > 0 {
            total += at(self.x - 1, self.y - 1);
        }
        total
    }
}

/// A decision stump over one Haar-like feature.
///
/// The feature value is the weighted sum of its rectangles. It votes `pass`
/// when the value reaches `threshold` times the window's standard deviation
/// (at least 1), and `fail` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaarFeature {
    pub rects: Vec<HaarRect>,
    pub threshold: i32,
    pub pass: i32,
    pub fail: i32,
}

impl HaarFeature {
    fn vote(&self, sat: &[i32], stride: usize, norm: i64) -> i32 {
        let value: i64 = self
            .rects
            .iter()
            .map(|r| r.weight as i64 * r.sum(sat, stride))
            .sum();
        if value >= self.threshold as i64 * norm {
            self.pass
        } else {
            self.fail
        }
    }
}

/// Features whose votes must add up to `threshold` for the window to advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaarStage {
    pub features: Vec<HaarFeature>,
    pub threshold: i32,
}

/// Attentional cascade of boosted Haar-feature stages.
///
/// A window is positive only when every stage accepts it; evaluation stops at
/// the first rejecting stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaarCascade {
    pub window: Size,
    pub stages: Vec<HaarStage>,
}

impl HaarCascade {
    pub const NAME: &'static str = "HaarCascade";

    pub fn new(window: Size, stages: Vec<HaarStage>) -> Result<Self> {
        let cascade = Self { window, stages };
        cascade.validate()?;
        Ok(cascade)
    }

    /// Checks the window size and that every rectangle fits inside the window.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::parameter(Self::NAME, "window", self.window));
        }
        if self.stages.is_empty() {
            return Err(Error::parameter(Self::NAME, "stages", "none"));
        }
        let rects = self
            .stages
            .iter()
            .flat_map(|s| &s.features)
            .flat_map(|f| &f.rects);
        for r in rects {
            let fits = r.width > 0
                && r.height > 0
                && r.x + r.width <= self.window.width
                && r.y + r.height <= self.window.height;
            if !fits {
                return Err(Error::parameter(
                    Self::NAME,
                    "rect",
                    format!(
                        "{}x{} at ({}, {}) outside {} window",
                        r.width, r.height, r.x, r.y, self.window
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Index of the first stage rejecting the window, `None` if all accept.
    pub fn rejecting_stage(&self, window: &Gray8Image) -> Result<Option<usize>> {
        if window.size() != self.window {
            return Err(Error::SizeMismatch {
                stage: Self::NAME,
                expected: self.window,
                found: window.size(),
            });
        }

        let table: Gray32Image = integral_image(window)?;
        let sat = table.read();
        let norm = (Statistics::of(window)?.std_dev as i64).max(1);
        let stride = self.window.width;

        for (i, stage) in self.stages.iter().enumerate() {
            let total: i32 = stage
                .features
                .iter()
                .map(|f| f.vote(&sat, stride, norm))
                .sum();
            if total < stage.threshold {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }
}

impl Classifier for HaarCascade {
    fn window_size(&self) -> Size {
        self.window
    }

    fn classify(&self, window: &Gray8Image) -> Result<bool> {
        Ok(self.rejecting_stage(window)?.is_none())
    }
}
