//! Conversion between raw collaborator buffers and image planes.
//!
//! Gray samples are stored signed, centred on zero: `stored = unsigned - 128`.

use super::{Gray8Image, Plane, RgbImage, ALPHA_OPAQUE};
use crate::error::{Error, Result};

impl Plane<i8> {
    /// Builds a gray image from unsigned 8-bit samples.
    pub fn from_unsigned(width: usize, height: usize, samples: &[u8]) -> Result<Gray8Image> {
        let pixels = samples.iter().map(|&v| (v ^ 0x80) as i8).collect();
        Plane::from_vec(width, height, pixels)
    }

    /// Unsigned 8-bit samples suitable for a bitmap encoder.
    pub fn to_unsigned(&self) -> Vec<u8> {
        self.read().iter().map(|&v| v as u8 ^ 0x80).collect()
    }

    /// Takes the luma plane of an NV21 camera frame as a gray image.
    pub fn from_nv21_luma(width: usize, height: usize, frame: &[u8]) -> Result<Gray8Image> {
        check_nv21_len(width, height, frame.len())?;
        Self::from_unsigned(width, height, &frame[..width * height])
    }
}

impl Plane<u32> {
    /// Builds an RGB image from packed ARGB words; alpha is forced opaque.
    pub fn from_argb(width: usize, height: usize, words: &[u32]) -> Result<RgbImage> {
        let pixels = words.iter().map(|&w| w | ALPHA_OPAQUE).collect();
        Plane::from_vec(width, height, pixels)
    }

    pub fn to_argb(&self) -> Vec<u32> {
        self.to_vec()
    }

    /// Decodes an NV21 (YUV 4:2:0, interleaved VU) frame into opaque RGB.
    ///
    /// Uses the integer BT.601 video-range coefficients scaled by 1024.
    pub fn from_nv21(width: usize, height: usize, frame: &[u8]) -> Result<RgbImage> {
        check_nv21_len(width, height, frame.len())?;

        let frame_size = width * height;
        let mut pixels = Vec::with_capacity(frame_size);

        for y in 0..height {
            let uv_row = frame_size + (y >> 1) * width;
            for x in 0..width {
                let luma = (frame[y * width + x] as i32 - 16).max(0);
                let uv = uv_row + (x & !1);
                let v = frame[uv] as i32 - 128;
                let u = frame[uv + 1] as i32 - 128;

                let y1192 = 1192 * luma;
                let r = (y1192 + 1634 * v).clamp(0, 262_143);
                let g = (y1192 - 833 * v - 400 * u).clamp(0, 262_143);
                let b = (y1192 + 2066 * u).clamp(0, 262_143);

                pixels.push(
                    ALPHA_OPAQUE
                        | ((r << 6) as u32 & 0x00FF_0000)
                        | ((g >> 2) as u32 & 0x0000_FF00)
                        | ((b >> 10) as u32 & 0x0000_00FF),
                );
            }
        }

        Plane::from_vec(width, height, pixels)
    }
}

fn check_nv21_len(width: usize, height: usize, len: usize) -> Result<()> {
    if width % 2 != 0 || height % 2 != 0 {
        return Err(Error::parameter(
            "nv21",
            "size",
            format!("{}x{} (must be even)", width, height),
        ));
    }
    let expected = width * height * 3 / 2;
    if len < expected {
        return Err(Error::parameter(
            "nv21",
            "frame",
            format!("length {} < {}", len, expected),
        ));
    }
    Ok(())
}
