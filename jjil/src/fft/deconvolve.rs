use serde::{Deserialize, Serialize};

use super::fft1d::Fft;
use super::fft2d::fft_2d;
use crate::error::{Error, Result};
use crate::image::{Complex32Image, Gray8Image, Image, Pixels, Size};
use crate::math::{is_power_of_two, Complex};
use crate::pipeline::Transform;

/// Fractional bits of the normalised PSF transfer function.
const H_BITS: u32 = 15;
/// Fractional bits of the inverted transfer function.
const INV_BITS: u32 = 15;
/// Fractional bits of the Wiener gain.
const GAIN_BITS: u32 = 16;

/// Wiener deconvolution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeconvolutionConfig {
    /// Noise power compared against `|H|²·|I|²` per bin, where `H` is the PSF
    /// transfer function normalised to unit DC gain and `I` the input spectrum.
    /// Zero disables the Wiener gain and yields plain inverse filtering.
    pub noise: u64,
    /// Bins where `|H|` falls below this many hundredths are zeroed instead of
    /// inverted.
    pub min_response: u32,
}

impl Default for DeconvolutionConfig {
    fn default() -> Self {
        Self {
            noise: 1 << 20,
            min_response: 5,
        }
    }
}

impl DeconvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_response == 0 || self.min_response > 100 {
            return Err(Error::parameter(
                Complex32Deconvolve::NAME,
                "min_response",
                self.min_response,
            ));
        }
        Ok(())
    }
}

/// Wiener deconvolution of a Complex32 spectrum by a known point-spread function.
///
/// The PSF is a square power-of-two Gray8 image whose unsigned samples
/// (`v + 128`) are the blur weights, with its origin at pixel (0, 0) and
/// wrap-around. Input spectra must match the PSF size.
#[derive(Debug, Clone)]
pub struct Complex32Deconvolve {
    config: DeconvolutionConfig,
    size: usize,
    /// `conj(H) / |H|²` scaled by `2^INV_BITS`, zero where `H` is too weak.
    inverse: Vec<Complex>,
    /// `|H|²` scaled by `2^(2·H_BITS)`.
    response: Vec<i64>,
}

impl Complex32Deconvolve {
    pub fn new(psf: &Gray8Image, config: DeconvolutionConfig) -> Result<Self> {
        config.validate()?;

        let size = psf.width();
        if psf.height() != size || !is_power_of_two(size) {
            return Err(Error::parameter(
                Self::NAME,
                "psf size",
                format!("{} (must be square with power-of-two sides)", psf.size()),
            ));
        }

        let weights = psf.map(|&v| Complex::real(v as i32 + 128));
        let total: i64 = weights.read().iter().map(|c| c.real as i64).sum();
        if total == 0 {
            return Err(Error::parameter(Self::NAME, "psf", "all weights zero"));
        }

        let fft = Fft::new(size.max(2))?;
        let spectrum = fft_2d(&fft, &weights)?;

        // |H| >= min_response / 100  <=>  h2 * 100^2 >= min_response^2 * 2^(2·H_BITS)
        let floor = (config.min_response as i64).pow(2) << (2 * H_BITS);
        let mut inverse = Vec::with_capacity(spectrum.len());
        let mut response = Vec::with_capacity(spectrum.len());
        let mut zeroed = 0usize;

        for p in spectrum.read().iter() {
            let h_re = ((p.real as i64) << H_BITS) / total;
            let h_im = ((p.imag as i64) << H_BITS) / total;
            let h2 = h_re * h_re + h_im * h_im;
            response.push(h2);

            if h2 * 10_000 < floor {
                inverse.push(Complex::ZERO);
                zeroed += 1;
                continue;
            }
            // 1/H = conj(H) · 2^H_BITS / h2 in real units
            let scale = 1i64 << (H_BITS + INV_BITS);
            inverse.push(Complex::new(
                (h_re * scale / h2) as i32,
                (-h_im * scale / h2) as i32,
            ));
        }

        tracing::debug!(
            "{}: {}x{} psf, {} of {} bins below response floor",
            Self::NAME,
            size,
            size,
            zeroed,
            inverse.len()
        );

        Ok(Self {
            config,
            size,
            inverse,
            response,
        })
    }

    pub fn config(&self) -> &DeconvolutionConfig {
        &self.config
    }

    pub fn psf_size(&self) -> usize {
        self.size
    }

    fn deconvolve(&self, spectrum: &Complex32Image) -> Result<Complex32Image> {
        let noise = (self.config.noise as i128) << (2 * H_BITS);
        let input = spectrum.read();
        let mut out = Vec::with_capacity(input.len());

        for ((i, inv), &h2) in input.iter().zip(&self.inverse).zip(&self.response) {
            if *inv == Complex::ZERO {
                out.push(Complex::ZERO);
                continue;
            }
            let i2 = i.square_wide() as i128;
            let signal = h2 as i128 * i2;
            let den = signal + noise;
            let gain = if den == 0 { 0 } else { (signal << GAIN_BITS) / den };

            let (a, b) = (i.real as i128, i.imag as i128);
            let (c, d) = (inv.real as i128, inv.imag as i128);
            let shift = INV_BITS + GAIN_BITS;
            let re = ((a * c - b * d) * gain) >> shift;
            let im = ((a * d + b * c) * gain) >> shift;

            let narrow = |v: i128| {
                i32::try_from(v).map_err(|_| {
                    Error::overflow(format!("{}: deconvolved bin {}", Self::NAME, i))
                })
            };
            out.push(Complex::new(narrow(re)?, narrow(im)?));
        }
        drop(input);

        Complex32Image::from_vec(spectrum.width(), spectrum.height(), out)
    }
}

impl Transform for Complex32Deconvolve {
    const NAME: &'static str = "Complex32Deconvolve";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let spectrum = image.as_complex32(Self::NAME)?;
        if spectrum.width() != self.size || spectrum.height() != self.size {
            return Err(Error::SizeMismatch {
                stage: Self::NAME,
                expected: Size::new(self.size, self.size),
                found: spectrum.size(),
            });
        }
        let out = self.deconvolve(spectrum)?;
        image.replace_pixels(Pixels::Complex32(out))
    }
}
