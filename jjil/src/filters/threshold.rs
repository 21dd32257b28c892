use super::histogram::histogram;
use crate::error::{Error, Result};
use crate::image::{Gray8Image, Image};
use crate::pipeline::Transform;

/// Binarises a gray image: samples above the threshold become `i8::MAX`,
/// the rest `i8::MIN`. Inverted thresholds swap the two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8Threshold {
    threshold: i8,
    inverted: bool,
}

impl Gray8Threshold {
    pub fn new(threshold: i32) -> Result<Self> {
        let threshold = i8::try_from(threshold)
            .map_err(|_| Error::parameter(Self::NAME, "threshold", threshold))?;
        Ok(Self {
            threshold,
            inverted: false,
        })
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = !self.inverted;
        self
    }

    pub fn threshold(&self) -> i8 {
        self.threshold
    }

    pub(crate) fn binarize(&self, plane: &Gray8Image) {
        let (above, below) = if self.inverted {
            (i8::MIN, i8::MAX)
        } else {
            (i8::MAX, i8::MIN)
        };
        for v in plane.write().iter_mut() {
            *v = if *v > self.threshold { above } else { below };
        }
    }
}

impl Transform for Gray8Threshold {
    const NAME: &'static str = "Gray8Threshold";

    fn apply(&mut self, image: Image) -> Result<Image> {
        self.binarize(image.as_gray8(Self::NAME)?);
        Ok(image)
    }
}

/// Otsu's threshold: the sample value maximising between-class variance.
///
/// Samples at or below the returned value form the background class.
pub fn otsu_threshold(hist: &[u32; 256]) -> i8 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    let sum_all: u64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c as u64)
        .sum();

    let mut weight_background = 0u64;
    let mut sum_background = 0u64;
    let mut best_between = -1.0f64;
    let mut best = None;

    for (t, &count) in hist.iter().enumerate() {
        weight_background += count as u64;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0 {
            break;
        }
        sum_background += t as u64 * count as u64;

        let mean_background = sum_background as f64 / weight_background as f64;
        let mean_foreground = (sum_all - sum_background) as f64 / weight_foreground as f64;
        let diff = mean_background - mean_foreground;
        let between = weight_background as f64 * weight_foreground as f64 * diff * diff;

        if between > best_between {
            best_between = between;
            best = Some(t);
        }
    }

    // single-valued histograms have no split; put everything in the background
    let index = best.unwrap_or_else(|| hist.iter().rposition(|&c| c > 0).unwrap_or(0));
    (index as i32 - 128) as i8
}

/// Automatic binarisation using [`otsu_threshold`]; the chosen value is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gray8OtsuThreshold {
    threshold: Option<i8>,
}

impl Gray8OtsuThreshold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threshold chosen on the last successful push.
    pub fn threshold(&self) -> Option<i8> {
        self.threshold
    }
}

impl Transform for Gray8OtsuThreshold {
    const NAME: &'static str = "Gray8OtsuThreshold";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let threshold = otsu_threshold(&histogram(plane));

        tracing::debug!("Otsu threshold {} for {} image", threshold, plane.size());

        Gray8Threshold::new(threshold as i32)?.binarize(plane);
        self.threshold = Some(threshold);
        Ok(image)
    }
}
