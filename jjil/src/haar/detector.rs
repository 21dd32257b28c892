use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::cascade::{Classifier, HaarCascade};
use crate::error::{Error, Result};
use crate::geometry::{resample_nearest, Gray8MaskedSubImageGenerator, Gray8Shrink};
use crate::image::{Gray8Image, Image, Rect, Size, MASK_ACTIVE, MASK_MASKED};
use crate::pipeline::{PipelineStage, Transform};

/// Unit of the scale factors: 100 means full resolution.
pub const SCALE_UNIT: u32 = 100;

/// Largest accepted `max_scale`: a 65536-fold shrink.
pub const MAX_SCALE: u32 = SCALE_UNIT << 16;

/// Scan parameters of [`Gray8DetectHaarMultiScale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaarDetectorConfig {
    /// Finest shrink factor, in hundredths.
    pub min_scale: u32,
    /// Coarsest shrink factor, in hundredths.
    pub max_scale: u32,
    /// Window stride in pixels of the shrunk image.
    pub step: usize,
}

impl Default for HaarDetectorConfig {
    fn default() -> Self {
        Self {
            min_scale: SCALE_UNIT,
            max_scale: 4 * SCALE_UNIT,
            step: 2,
        }
    }
}

impl HaarDetectorConfig {
    const NAME: &'static str = "HaarDetectorConfig";

    pub fn validate(&self) -> Result<()> {
        if self.min_scale < SCALE_UNIT {
            return Err(Error::parameter(Self::NAME, "min_scale", self.min_scale));
        }
        if self.max_scale > MAX_SCALE {
            return Err(Error::parameter(Self::NAME, "max_scale", self.max_scale));
        }
        if self.max_scale < self.min_scale {
            return Err(Error::parameter(
                Self::NAME,
                "max_scale",
                format!("{} < min_scale {}", self.max_scale, self.min_scale),
            ));
        }
        if self.step == 0 {
            return Err(Error::parameter(Self::NAME, "step", self.step));
        }
        Ok(())
    }

    /// Scale factors visited, coarsest first; each is two thirds of the previous.
    pub fn scales(&self) -> impl Iterator<Item = u32> {
        let min = self.min_scale;
        std::iter::successors(Some(self.max_scale), |&s| Some((s as u64 * 2 / 3) as u32))
            .take_while(move |&s| s >= min)
    }
}

/// Coarse-to-fine sliding-window detector.
///
/// Each round shrinks the input by the round's scale, scans it with the
/// classifier and masks every hit, so finer rounds skip windows centred on an
/// earlier detection. The output is the detection mask at input resolution:
/// [`MASK_MASKED`] inside detections, [`MASK_ACTIVE`] elsewhere.
#[derive(Debug, Clone)]
pub struct Gray8DetectHaarMultiScale<C = HaarCascade> {
    classifier: C,
    config: HaarDetectorConfig,
    detections: Vec<Rect>,
}

impl<C: Classifier> Gray8DetectHaarMultiScale<C> {
    pub fn new(classifier: C, config: HaarDetectorConfig) -> Result<Self> {
        config.validate()?;
        let window = classifier.window_size();
        if window.width == 0 || window.height == 0 {
            return Err(Error::parameter(Self::NAME, "window", window));
        }
        Ok(Self {
            classifier,
            config,
            detections: Vec::new(),
        })
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn config(&self) -> &HaarDetectorConfig {
        &self.config
    }

    /// Detections of the last push in input coordinates, in the order found.
    pub fn detections(&self) -> &[Rect] {
        &self.detections
    }

    /// Runs every scale round over `plane` and returns the detection mask.
    pub fn detect(&mut self, plane: &Gray8Image) -> Result<Gray8Image> {
        let size = plane.size();
        let window = self.classifier.window_size();
        if !size.contains(window) {
            return Err(Error::ImageTooSmall {
                stage: Self::NAME,
                size,
                required: window,
            });
        }

        let mask = Gray8Image::new_filled(size.width, size.height, MASK_ACTIVE)?;
        let mut detections = Vec::new();
        for scale in self.config.scales() {
            let target = Size::new(
                size.width * SCALE_UNIT as usize / scale as usize,
                size.height * SCALE_UNIT as usize / scale as usize,
            );
            if !target.contains(window) {
                tracing::warn!(scale, %target, %window, "haar round skipped, image below window size");
                continue;
            }
            let hits = self.scan(plane, &mask, scale, target, &mut detections)?;
            tracing::debug!(scale, %target, hits, "haar scale round");
        }

        self.detections = detections;
        Ok(mask)
    }

    /// One round at `scale`; merges its hits into `mask` and returns their count.
    fn scan(
        &self,
        plane: &Gray8Image,
        mask: &Gray8Image,
        scale: u32,
        target: Size,
        detections: &mut Vec<Rect>,
    ) -> Result<usize> {
        let window = self.classifier.window_size();
        let shrunk = Gray8Shrink::new(target.width, target.height)?.shrink(plane)?;
        let round_mask = resample_nearest(mask, target.width, target.height)?;

        let mut windows = Gray8MaskedSubImageGenerator::new(window, self.config.step, self.config.step)?;
        windows.push(Image::from(shrunk).with_mask(round_mask.share())?)?;

        let to_input = |v: i32| (v as i64 * scale as i64 / SCALE_UNIT as i64) as i32;
        let mut hits = 0;
        while !windows.is_empty() {
            let candidate = windows.front()?;
            if !self.classifier.classify(candidate.as_gray8(Self::NAME)?)? {
                continue;
            }
            let origin = candidate.offset().unwrap_or(IVec2::ZERO);
            tracing::trace!(x = origin.x, y = origin.y, scale, "haar hit");

            mark(&round_mask, origin, window);
            detections.push(Rect::new(
                to_input(origin.x),
                to_input(origin.y),
                to_input(window.width as i32),
                to_input(window.height as i32),
            ));
            hits += 1;
        }

        if hits > 0 {
            let stretched = resample_nearest(&round_mask, mask.width(), mask.height())?;
            let stretched = stretched.read();
            for (m, &s) in mask.write().iter_mut().zip(stretched.iter()) {
                if s != MASK_ACTIVE {
                    *m = MASK_MASKED;
                }
            }
        }
        Ok(hits)
    }
}

/// Masks the window at `origin`; the generator guarantees it lies inside `mask`.
fn mark(mask: &Gray8Image, origin: IVec2, window: Size) {
    let (x0, y0) = (origin.x as usize, origin.y as usize);
    let stride = mask.width();
    let mut pixels = mask.write();
    for y in y0..y0 + window.height {
        pixels[y * stride + x0..y * stride + x0 + window.width].fill(MASK_MASKED);
    }
}

impl<C: Classifier> Transform for Gray8DetectHaarMultiScale<C> {
    const NAME: &'static str = "Gray8DetectHaarMultiScale";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let mask = self.detect(image.as_gray8(Self::NAME)?)?;
        let out = Image::from(mask);
        Ok(match image.offset() {
            Some(offset) => out.with_offset(offset),
            None => out,
        })
    }
}
