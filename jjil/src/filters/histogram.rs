use crate::error::Result;
use crate::image::{Gray8Image, Image};
use crate::pipeline::Transform;

/// 256-bin histogram indexed by `sample + 128`.
pub fn histogram(plane: &Gray8Image) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &v in plane.read().iter() {
        hist[(v as i32 + 128) as usize] += 1;
    }
    hist
}

/// Records the histogram of each pushed image and passes the image through.
#[derive(Debug, Clone)]
pub struct Gray8Histogram {
    hist: Option<[u32; 256]>,
}

impl Default for Gray8Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Gray8Histogram {
    pub fn new() -> Self {
        Self { hist: None }
    }

    pub fn histogram(&self) -> Option<&[u32; 256]> {
        self.hist.as_ref()
    }
}

impl Transform for Gray8Histogram {
    const NAME: &'static str = "Gray8Histogram";

    fn apply(&mut self, image: Image) -> Result<Image> {
        self.hist = Some(histogram(image.as_gray8(Self::NAME)?));
        Ok(image)
    }
}

/// Histogram equalisation over the full signed 8-bit range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8HistEq;

impl Transform for Gray8HistEq {
    const NAME: &'static str = "Gray8HistEq";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let hist = histogram(plane);

        let mut cdf = [0u64; 256];
        let mut running = 0u64;
        for (i, &count) in hist.iter().enumerate() {
            running += count as u64;
            cdf[i] = running;
        }
        let total = running;
        let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);

        if total == cdf_min {
            // single-valued image, nothing to spread
            return Ok(image);
        }

        let mut lut = [0i8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let scaled = cdf[i].saturating_sub(cdf_min) * 255 / (total - cdf_min);
            *entry = (scaled as i32 - 128) as i8;
        }

        for v in plane.write().iter_mut() {
            *v = lut[(*v as i32 + 128) as usize];
        }
        Ok(image)
    }
}
