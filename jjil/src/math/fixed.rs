use crate::error::{Error, Result};

/// Number of fractional bits in the default fixed-point representation.
pub const SCALE_BITS: u32 = 8;
/// 1.0 in the default fixed-point representation.
pub const SCALE: i32 = 1 << SCALE_BITS;
/// pi scaled by [`SCALE`].
pub const PI: i32 = 804;

/// sin(d) * SCALE for d in 0..=90 degrees.
const SIN_QUARTER: [i32; 91] = [
    0, 4, 9, 13, 18, 22, 27, 31, 36, 40, 44, 49, 53, 58, 62, 66, 71, 75, 79, 83, 88, 92, 96, 100,
    104, 108, 112, 116, 120, 124, 128, 132, 136, 139, 143, 147, 150, 154, 158, 161, 165, 168, 171,
    175, 178, 181, 184, 187, 190, 193, 196, 199, 202, 204, 207, 210, 212, 215, 217, 219, 222, 224,
    226, 228, 230, 232, 234, 236, 237, 239, 241, 242, 243, 245, 246, 247, 248, 249, 250, 251, 252,
    253, 254, 254, 255, 255, 255, 256, 256, 256, 256,
];

/// Sine of an integer number of degrees, scaled by [`SCALE`].
pub fn sin_deg(degrees: i32) -> i32 {
    let d = degrees.rem_euclid(360) as usize;
    match d {
        0..=90 => SIN_QUARTER[d],
        91..=180 => SIN_QUARTER[180 - d],
        181..=270 => -SIN_QUARTER[d - 180],
        _ => -SIN_QUARTER[360 - d],
    }
}

/// Cosine of an integer number of degrees, scaled by [`SCALE`].
pub fn cos_deg(degrees: i32) -> i32 {
    sin_deg(degrees + 90)
}

/// Floor of the square root using Newton's iteration.
pub fn isqrt(value: i64) -> Result<i64> {
    if value < 0 {
        return Err(Error::SqrtOfNegative { value });
    }
    Ok(isqrt_u64(value as u64) as i64)
}

pub(crate) fn isqrt_u64(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = x / 2 + (x & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Integer division that reports a zero divisor instead of panicking.
pub fn div(numerator: i32, denominator: i32) -> Result<i32> {
    if denominator == 0 {
        return Err(Error::divide_by_zero(format!("{} / 0", numerator)));
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| Error::overflow(format!("{} / {}", numerator, denominator)))
}

/// Product of two [`SCALE`]d values, rounded back to [`SCALE`].
#[inline]
pub fn mul_scaled(a: i32, b: i32) -> i32 {
    round_shift(a as i64 * b as i64, SCALE_BITS) as i32
}

/// Arithmetic right shift rounding half away from zero.
#[inline]
pub fn round_shift(value: i64, bits: u32) -> i64 {
    if bits == 0 {
        return value;
    }
    let half = 1i64 << (bits - 1);
    if value >= 0 {
        (value + half) >> bits
    } else {
        -((-value + half) >> bits)
    }
}

#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Base-2 logarithm of a power of two.
#[inline]
pub fn log2(n: usize) -> u32 {
    debug_assert!(is_power_of_two(n));
    n.trailing_zeros()
}
