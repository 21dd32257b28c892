//! Packed ARGB word helpers.
//!
//! Byte 3 is alpha, 2 red, 1 green, 0 blue. Channel accessors return the
//! signed-byte convention used by gray images: unsigned value minus 128.

use serde::{Deserialize, Serialize};

pub const ALPHA_OPAQUE: u32 = 0xFF00_0000;

const RED_SHIFT: u32 = 16;
const GREEN_SHIFT: u32 = 8;
const BLUE_SHIFT: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum RgbChannel {
    Red,
    Green,
    Blue,
}

impl RgbChannel {
    #[inline]
    fn shift(self) -> u32 {
        match self {
            RgbChannel::Red => RED_SHIFT,
            RgbChannel::Green => GREEN_SHIFT,
            RgbChannel::Blue => BLUE_SHIFT,
        }
    }

    #[inline]
    pub fn extract(self, argb: u32) -> i8 {
        to_signed((argb >> self.shift()) as u8)
    }
}

#[inline]
fn to_signed(value: u8) -> i8 {
    (value ^ 0x80) as i8
}

#[inline]
fn to_unsigned(value: i8) -> u32 {
    (value as u8 ^ 0x80) as u32
}

/// Packs signed channels into an opaque ARGB word.
#[inline]
pub fn pack_argb(r: i8, g: i8, b: i8) -> u32 {
    ALPHA_OPAQUE
        | (to_unsigned(r) << RED_SHIFT)
        | (to_unsigned(g) << GREEN_SHIFT)
        | (to_unsigned(b) << BLUE_SHIFT)
}

#[inline]
pub fn red(argb: u32) -> i8 {
    RgbChannel::Red.extract(argb)
}

#[inline]
pub fn green(argb: u32) -> i8 {
    RgbChannel::Green.extract(argb)
}

#[inline]
pub fn blue(argb: u32) -> i8 {
    RgbChannel::Blue.extract(argb)
}
