//! Fixed-point FFT: the cached-root 1D engine, separable 2D transforms and
//! Wiener deconvolution.

mod deconvolve;
mod fft1d;
mod fft2d;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use deconvolve::{Complex32Deconvolve, DeconvolutionConfig};
pub use fft1d::{Fft, MAX_LEN_LIMIT, ROOT_BITS};
pub use fft2d::{fft_2d, ifft_2d, Complex32IFft, Complex32Magnitude, Gray8Fft};

/// Left shift applied to 8-bit samples entering a forward transform.
pub const FFT_SCALE: u32 = 5;

/// How complex results are brought back to 8 bits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum OutputMode {
    /// Stretch the observed minimum and maximum to -128 and 127.
    Rescale,
    /// Undo [`FFT_SCALE`] and clamp.
    #[default]
    Clamp,
}
