use std::fmt;
use std::ops::{Add, AddAssign, Neg, Shl, Shr, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::fixed::{isqrt_u64, round_shift};
use crate::error::{Error, Result};

/// Components below this bound can be squared and summed without leaving i32.
const MAGNITUDE_LIMIT: u64 = 1 << 15;

/// Complex number with scaled-integer components.
///
/// All operations return new values; nothing mutates in place. The operator
/// impls (`+`, `-`, unary `-`, `<<`, `>>`) wrap on overflow in every build
/// profile; use [`Complex::checked_add`] and [`Complex::checked_sub`] where
/// the operands are not already range-bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Complex {
    pub real: i32,
    pub imag: i32,
}

impl Complex {
    pub const ZERO: Complex = Complex::new(0, 0);

    /// Shift step applied to both components before squaring operands too
    /// large for 32-bit arithmetic; the magnitude is scaled back afterwards.
    pub const SHIFT: u32 = 8;

    #[inline]
    pub const fn new(real: i32, imag: i32) -> Self {
        Self { real, imag }
    }

    #[inline]
    pub const fn real(real: i32) -> Self {
        Self::new(real, 0)
    }

    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(self.real, self.imag.wrapping_neg())
    }

    /// Component-wise sum, failing when either component leaves i32.
    pub fn checked_add(self, rhs: Complex) -> Result<Complex> {
        match (self.real.checked_add(rhs.real), self.imag.checked_add(rhs.imag)) {
            (Some(re), Some(im)) => Ok(Complex::new(re, im)),
            _ => Err(Error::overflow(format!("{} + {}", self, rhs))),
        }
    }

    /// Component-wise difference, failing when either component leaves i32.
    pub fn checked_sub(self, rhs: Complex) -> Result<Complex> {
        match (self.real.checked_sub(rhs.real), self.imag.checked_sub(rhs.imag)) {
            (Some(re), Some(im)) => Ok(Complex::new(re, im)),
            _ => Err(Error::overflow(format!("{} - {}", self, rhs))),
        }
    }

    /// `real² + imag²`, failing when the result leaves i32.
    pub fn square(self) -> Result<i32> {
        let sq = self.square_wide();
        i32::try_from(sq).map_err(|_| Error::overflow(format!("square of {}", self)))
    }

    /// `real² + imag²` computed in 64 bits.
    #[inline]
    pub fn square_wide(self) -> i64 {
        let re = self.real as i64;
        let im = self.imag as i64;
        re * re + im * im
    }

    /// Integer magnitude using the default [`Complex::SHIFT`] step.
    pub fn magnitude(self) -> i32 {
        self.magnitude_with_shift(Self::SHIFT)
    }

    /// Integer magnitude. Operands too large to square in 32 bits are shifted
    /// right by multiples of `shift` first, trading low-order precision for range.
    pub fn magnitude_with_shift(self, shift: u32) -> i32 {
        let shift = shift.clamp(1, 16);
        let re = self.real.unsigned_abs() as u64;
        let im = self.imag.unsigned_abs() as u64;
        let largest = re.max(im);

        let mut applied = 0;
        while (largest >> applied) >= MAGNITUDE_LIMIT {
            applied += shift;
        }

        let re = re >> applied;
        let im = im >> applied;
        let root = isqrt_u64(re * re + im * im) << applied;
        root.min(i32::MAX as u64) as i32
    }

    /// Full-precision product with no rescaling.
    pub fn checked_mul(self, rhs: Complex) -> Result<Complex> {
        let (re, im) = self.mul_wide(rhs);
        narrow(re, im).ok_or_else(|| Error::overflow(format!("{} * {}", self, rhs)))
    }

    /// Product of two scaled values, rounded and shifted right by `bits`.
    #[inline]
    pub fn mul_shift(self, rhs: Complex, bits: u32) -> Complex {
        let (re, im) = self.mul_wide(rhs);
        Complex::new(round_shift(re, bits) as i32, round_shift(im, bits) as i32)
    }

    #[inline]
    fn mul_wide(self, rhs: Complex) -> (i64, i64) {
        let (a, b) = (self.real as i64, self.imag as i64);
        let (c, d) = (rhs.real as i64, rhs.imag as i64);
        (a * c - b * d, a * d + b * c)
    }

    /// Complex quotient, failing on a zero divisor.
    pub fn checked_div(self, rhs: Complex) -> Result<Complex> {
        let den = rhs.square_wide();
        if den == 0 {
            return Err(Error::divide_by_zero(format!("{} / {}", self, rhs)));
        }
        let (re, im) = self.mul_wide(rhs.conjugate());
        narrow(re / den, im / den).ok_or_else(|| Error::overflow(format!("{} / {}", self, rhs)))
    }

    /// Divides both components by an integer, failing on zero.
    pub fn div_scalar(self, divisor: i32) -> Result<Complex> {
        if divisor == 0 {
            return Err(Error::divide_by_zero(format!("{} / 0", self)));
        }
        match (self.real.checked_div(divisor), self.imag.checked_div(divisor)) {
            (Some(re), Some(im)) => Ok(Complex::new(re, im)),
            _ => Err(Error::overflow(format!("{} / {}", self, divisor))),
        }
    }
}

#[inline]
fn narrow(re: i64, im: i64) -> Option<Complex> {
    Some(Complex::new(i32::try_from(re).ok()?, i32::try_from(im).ok()?))
}

impl Add for Complex {
    type Output = Complex;

    #[inline]
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.real.wrapping_add(rhs.real), self.imag.wrapping_add(rhs.imag))
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Complex) {
        *self = *self + rhs;
    }
}

impl Sub for Complex {
    type Output = Complex;

    #[inline]
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.real.wrapping_sub(rhs.real), self.imag.wrapping_sub(rhs.imag))
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Complex) {
        *self = *self - rhs;
    }
}

impl Neg for Complex {
    type Output = Complex;

    #[inline]
    fn neg(self) -> Complex {
        Complex::new(self.real.wrapping_neg(), self.imag.wrapping_neg())
    }
}

impl Shl<u32> for Complex {
    type Output = Complex;

    #[inline]
    fn shl(self, bits: u32) -> Complex {
        Complex::new(self.real.wrapping_shl(bits), self.imag.wrapping_shl(bits))
    }
}

impl Shr<u32> for Complex {
    type Output = Complex;

    #[inline]
    fn shr(self, bits: u32) -> Complex {
        Complex::new(self.real.wrapping_shr(bits), self.imag.wrapping_shr(bits))
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.imag < 0 {
            write!(f, "{}-{}i", self.real, -(self.imag as i64))
        } else {
            write!(f, "{}+{}i", self.real, self.imag)
        }
    }
}
