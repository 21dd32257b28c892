use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::image::{clamp_i8, Gray8Image, Image, Pixels};
use crate::math::{round_shift, SCALE, SCALE_BITS};
use crate::pipeline::Transform;

/// Largest accepted Gaussian sigma, in hundredths of a pixel.
const MAX_SIGMA: u32 = 10_000;

/// 2D convolution with an odd-sized integer kernel and an integer divisor.
///
/// Borders replicate the nearest edge sample.
#[derive(Debug, Clone)]
pub struct Gray8Convolve {
    kernel: Vec<i32>,
    width: usize,
    height: usize,
    divisor: i32,
}

impl Gray8Convolve {
    pub fn new(kernel: Vec<i32>, width: usize, height: usize, divisor: i32) -> Result<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(Error::parameter(
                Self::NAME,
                "kernel size",
                format!("{}x{} (must be odd)", width, height),
            ));
        }
        if kernel.len() != width * height {
            return Err(Error::parameter(
                Self::NAME,
                "kernel",
                format!("{} entries for {}x{}", kernel.len(), width, height),
            ));
        }
        if divisor == 0 {
            return Err(Error::parameter(Self::NAME, "divisor", divisor));
        }
        Ok(Self {
            kernel,
            width,
            height,
            divisor,
        })
    }

    /// Box blur of the given odd size.
    pub fn box_blur(size: usize) -> Result<Self> {
        let n = size * size;
        Self::new(vec![1; n], size, size, n.max(1) as i32)
    }

    fn convolve(&self, src: &Gray8Image) -> Result<Gray8Image> {
        let (w, h) = (src.width(), src.height());
        let (kw, kh) = (self.width as isize, self.height as isize);
        let (cx, cy) = (kw / 2, kh / 2);
        let guard = src.read();
        let input = guard.as_slice();

        let mut out = vec![0i8; w * h];
        out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0i64;
                for ky in 0..kh {
                    let sy = (y as isize + ky - cy).clamp(0, h as isize - 1) as usize;
                    for kx in 0..kw {
                        let sx = (x as isize + kx - cx).clamp(0, w as isize - 1) as usize;
                        let weight = self.kernel[(ky * kw + kx) as usize] as i64;
                        acc += weight * input[sy * w + sx] as i64;
                    }
                }
                *dst = clamp_i8((acc / self.divisor as i64) as i32);
            }
        });
        drop(guard);

        Gray8Image::from_vec(w, h, out)
    }
}

impl Transform for Gray8Convolve {
    const NAME: &'static str = "Gray8Convolve";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let result = self.convolve(image.as_gray8(Self::NAME)?)?;
        image.replace_pixels(Pixels::Gray8(result))
    }
}

/// Separable Gaussian smoothing with sigma given in hundredths of a pixel.
#[derive(Debug, Clone)]
pub struct Gray8GaussSmooth {
    sigma: u32,
    weights: Vec<i32>,
}

impl Gray8GaussSmooth {
    pub fn new(sigma: u32) -> Result<Self> {
        if sigma == 0 || sigma > MAX_SIGMA {
            return Err(Error::parameter(Self::NAME, "sigma", sigma));
        }
        Ok(Self {
            sigma,
            weights: gaussian_weights(sigma),
        })
    }

    pub fn sigma(&self) -> u32 {
        self.sigma
    }

    /// Fixed-point kernel weights summing to [`SCALE`].
    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    fn pass(&self, src: &[i8], w: usize, h: usize, horizontal: bool) -> Vec<i8> {
        let radius = (self.weights.len() / 2) as isize;
        let mut out = vec![0i8; w * h];
        out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0i64;
                for (k, &weight) in self.weights.iter().enumerate() {
                    let d = k as isize - radius;
                    let (sx, sy) = if horizontal {
                        ((x as isize + d).clamp(0, w as isize - 1) as usize, y)
                    } else {
                        (x, (y as isize + d).clamp(0, h as isize - 1) as usize)
                    };
                    acc += weight as i64 * src[sy * w + sx] as i64;
                }
                *dst = clamp_i8(round_shift(acc, SCALE_BITS) as i32);
            }
        });
        out
    }
}

fn gaussian_weights(sigma: u32) -> Vec<i32> {
    let sigma = sigma as f64 / 100.0;
    let radius = (3.0 * sigma).ceil().max(1.0) as i32;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    let mut weights: Vec<i32> = raw
        .iter()
        .map(|w| (w / total * SCALE as f64).round() as i32)
        .collect();

    // push rounding error into the centre tap so the kernel sums to SCALE
    let error = SCALE - weights.iter().sum::<i32>();
    weights[radius as usize] += error;
    weights
}

impl Transform for Gray8GaussSmooth {
    const NAME: &'static str = "Gray8GaussSmooth";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let (w, h) = (plane.width(), plane.height());
        let horizontal = self.pass(&plane.read(), w, h, true);
        let smoothed = self.pass(&horizontal, w, h, false);
        plane.write().copy_from_slice(&smoothed);
        Ok(image)
    }
}
