use rayon::prelude::*;

use super::fft1d::Fft;
use super::{OutputMode, FFT_SCALE};
use crate::error::{Error, Result};
use crate::image::{clamp_i8, Complex32Image, Gray8Image, Image, Pixels, Size};
use crate::math::{is_power_of_two, round_shift, Complex};
use crate::pipeline::Transform;

/// Separable 2D forward transform: rows, transpose, rows, transpose back.
pub fn fft_2d(fft: &Fft, plane: &Complex32Image) -> Result<Complex32Image> {
    transform_2d(plane, |row| fft.forward(row))
}

/// Separable 2D inverse transform.
pub fn ifft_2d(fft: &Fft, plane: &Complex32Image) -> Result<Complex32Image> {
    transform_2d(plane, |row| fft.inverse(row))
}

fn transform_2d<F>(plane: &Complex32Image, f: F) -> Result<Complex32Image>
where
    F: Fn(&[Complex]) -> Result<Vec<Complex>> + Sync,
{
    let (w, h) = (plane.width(), plane.height());
    let mut data = plane.to_vec();

    transform_rows(&mut data, w, &f)?;
    let mut data = transpose(&data, w, h);
    transform_rows(&mut data, h, &f)?;
    let data = transpose(&data, h, w);

    Complex32Image::from_vec(w, h, data)
}

fn transform_rows<F>(data: &mut [Complex], width: usize, f: &F) -> Result<()>
where
    F: Fn(&[Complex]) -> Result<Vec<Complex>> + Sync,
{
    data.par_chunks_mut(width).try_for_each(|row| {
        let out = f(row)?;
        row.copy_from_slice(&out);
        Ok(())
    })
}

/// Out-of-place transpose of a `width x height` row-major buffer.
fn transpose(data: &[Complex], width: usize, height: usize) -> Vec<Complex> {
    let mut out = vec![Complex::ZERO; data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}

fn check_power_of_two(stage: &'static str, size: Size) -> Result<()> {
    if !is_power_of_two(size.width) || !is_power_of_two(size.height) {
        return Err(Error::parameter(
            stage,
            "image size",
            format!("{} (sides must be powers of two)", size),
        ));
    }
    Ok(())
}

/// Converts samples to 8 bits according to `mode`.
///
/// `Clamp` undoes [`FFT_SCALE`] with a rounding shift; `Rescale` stretches the
/// observed range to `[-128, 127]`.
pub(crate) fn to_gray8(values: &[i64], size: Size, mode: OutputMode) -> Result<Gray8Image> {
    let out: Vec<i8> = match mode {
        OutputMode::Clamp => values
            .iter()
            .map(|&v| {
                let shifted = round_shift(v, FFT_SCALE);
                clamp_i8(shifted.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            })
            .collect(),
        OutputMode::Rescale => {
            let min = values.iter().copied().min().unwrap_or(0);
            let max = values.iter().copied().max().unwrap_or(0);
            let range = (max - min) as i128;
            values
                .iter()
                .map(|&v| {
                    if range == 0 {
                        0
                    } else {
                        ((v - min) as i128 * 255 / range - 128) as i8
                    }
                })
                .collect()
        }
    };
    Gray8Image::from_vec(size.width, size.height, out)
}

/// Gray8 to Complex32 forward 2D FFT.
///
/// Samples are shifted left by [`FFT_SCALE`] before transforming. Both image
/// sides must be powers of two; the root table grows to fit.
#[derive(Debug, Clone)]
pub struct Gray8Fft {
    fft: Fft,
}

impl Gray8Fft {
    pub fn new(max_len: usize) -> Result<Self> {
        Ok(Self {
            fft: Fft::new(max_len)?,
        })
    }

    pub fn fft(&self) -> &Fft {
        &self.fft
    }
}

impl Transform for Gray8Fft {
    const NAME: &'static str = "Gray8Fft";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        check_power_of_two(Self::NAME, plane.size())?;
        self.fft.grow_to(plane.width().max(plane.height()))?;

        let input = plane.map(|&v| Complex::real((v as i32) << FFT_SCALE));
        let spectrum = fft_2d(&self.fft, &input)?;

        tracing::debug!("{}: transformed {} image", Self::NAME, plane.size());
        image.replace_pixels(Pixels::Complex32(spectrum))
    }
}

/// Complex32 to Gray8 inverse 2D FFT, keeping the real part.
#[derive(Debug, Clone)]
pub struct Complex32IFft {
    fft: Fft,
    mode: OutputMode,
}

impl Complex32IFft {
    pub fn new(max_len: usize, mode: OutputMode) -> Result<Self> {
        Ok(Self {
            fft: Fft::new(max_len)?,
            mode,
        })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

impl Transform for Complex32IFft {
    const NAME: &'static str = "Complex32IFft";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_complex32(Self::NAME)?;
        check_power_of_two(Self::NAME, plane.size())?;
        self.fft.grow_to(plane.width().max(plane.height()))?;

        let spatial = ifft_2d(&self.fft, plane)?;
        let real: Vec<i64> = spatial.read().iter().map(|c| c.real as i64).collect();
        let gray = to_gray8(&real, plane.size(), self.mode)?;
        image.replace_pixels(Pixels::Gray8(gray))
    }
}

/// Complex32 to Gray8 magnitude, for inspecting spectra.
#[derive(Debug, Clone, Copy)]
pub struct Complex32Magnitude {
    mode: OutputMode,
}

impl Complex32Magnitude {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl Transform for Complex32Magnitude {
    const NAME: &'static str = "Complex32Magnitude";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_complex32(Self::NAME)?;
        let magnitudes: Vec<i64> = plane.read().iter().map(|c| c.magnitude() as i64).collect();
        let gray = to_gray8(&magnitudes, plane.size(), self.mode)?;
        image.replace_pixels(Pixels::Gray8(gray))
    }
}
