use crate::error::{Error, Result};
use crate::math::{is_power_of_two, isqrt_u64, log2, round_shift, Complex};

/// Fractional bits of the cached roots of unity.
pub const ROOT_BITS: u32 = 30;
/// Largest length the root table may be grown to.
pub const MAX_LEN_LIMIT: usize = 1 << 16;

const ONE: i64 = 1 << ROOT_BITS;

/// Radix-2 decimation-in-time FFT over power-of-two lengths.
///
/// Roots of unity are computed once with integer half-angle recurrences and
/// cached up to [`Fft::max_len`]. Growing the maximum recomputes the table;
/// asking for a smaller maximum keeps the existing one.
#[derive(Debug, Clone)]
pub struct Fft {
    max_len: usize,
    /// `exp(-2πik / max_len)` for `k < max_len / 2`, scaled by `2^ROOT_BITS`.
    roots: Vec<Complex>,
}

impl Fft {
    pub const NAME: &'static str = "Fft";

    pub fn new(max_len: usize) -> Result<Self> {
        check_max_len(max_len)?;
        Ok(Self {
            max_len,
            roots: roots_of_unity(max_len),
        })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Ensures transforms of up to `len` samples are supported.
    pub fn grow_to(&mut self, len: usize) -> Result<()> {
        if len <= self.max_len {
            return Ok(());
        }
        check_max_len(len)?;
        tracing::debug!("Fft: growing root table from {} to {}", self.max_len, len);
        self.max_len = len;
        self.roots = roots_of_unity(len);
        Ok(())
    }

    /// Forward transform, unnormalised.
    pub fn forward(&self, data: &[Complex]) -> Result<Vec<Complex>> {
        self.check_len(data.len())?;
        let mut out = vec![Complex::ZERO; data.len()];
        self.recurse(data, 1, &mut out)?;
        Ok(out)
    }

    /// Inverse transform: conjugate, forward, conjugate, divide by the length.
    pub fn inverse(&self, data: &[Complex]) -> Result<Vec<Complex>> {
        self.check_len(data.len())?;
        let conj: Vec<Complex> = data.iter().map(|c| c.conjugate()).collect();
        let mut out = vec![Complex::ZERO; data.len()];
        self.recurse(&conj, 1, &mut out)?;

        let bits = log2(data.len());
        for c in out.iter_mut() {
            let back = c.conjugate();
            *c = Complex::new(
                round_shift(back.real as i64, bits) as i32,
                round_shift(back.imag as i64, bits) as i32,
            );
        }
        Ok(out)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if !is_power_of_two(len) {
            return Err(Error::parameter(
                Self::NAME,
                "length",
                format!("{} (not a power of two)", len),
            ));
        }
        if len > self.max_len {
            return Err(Error::parameter(
                Self::NAME,
                "length",
                format!("{} (cached maximum {})", len, self.max_len),
            ));
        }
        Ok(())
    }

    /// Transforms every `stride`-th element of `input` into `out`.
    fn recurse(&self, input: &[Complex], stride: usize, out: &mut [Complex]) -> Result<()> {
        let n = out.len();
        if n == 1 {
            out[0] = input[0];
            return Ok(());
        }

        let half = n / 2;
        let (evens, odds) = out.split_at_mut(half);
        self.recurse(input, stride * 2, evens)?;
        self.recurse(&input[stride..], stride * 2, odds)?;

        let step = self.max_len / n;
        for k in 0..half {
            let (top, bottom) = butterfly(evens[k], odds[k], self.roots[k * step]).ok_or_else(
                || Error::overflow(format!("{}: butterfly of length {} at bin {}", Self::NAME, n, k)),
            )?;
            evens[k] = top;
            odds[k] = bottom;
        }
        Ok(())
    }
}

fn check_max_len(len: usize) -> Result<()> {
    if !is_power_of_two(len) || len < 2 || len > MAX_LEN_LIMIT {
        return Err(Error::parameter(Fft::NAME, "max_len", len));
    }
    Ok(())
}

/// `(even + w·odd, even − w·odd)` with overflow detection.
#[inline]
fn butterfly(even: Complex, odd: Complex, w: Complex) -> Option<(Complex, Complex)> {
    let (a, b) = (odd.real as i64, odd.imag as i64);
    let (c, d) = (w.real as i64, w.imag as i64);
    let t_re = round_shift(a * c - b * d, ROOT_BITS);
    let t_im = round_shift(a * d + b * c, ROOT_BITS);
    let (e_re, e_im) = (even.real as i64, even.imag as i64);

    Some((
        Complex::new(
            i32::try_from(e_re + t_re).ok()?,
            i32::try_from(e_im + t_im).ok()?,
        ),
        Complex::new(
            i32::try_from(e_re - t_re).ok()?,
            i32::try_from(e_im - t_im).ok()?,
        ),
    ))
}

/// Half of the angle whose cosine is `cos`, as `(cos, sin)` with sin ≥ 0.
fn half_angle(cos: i64) -> (i64, i64) {
    let c = isqrt_u64(((ONE + cos) * ONE / 2) as u64) as i64;
    let s = isqrt_u64(((ONE - cos) * ONE / 2) as u64) as i64;
    (c, s)
}

fn roots_of_unity(len: usize) -> Vec<Complex> {
    // principal roots for lengths 2, 4, .., len: angle 2π/m, starting at π
    let mut chain = vec![(-ONE, 0i64)];
    let mut m = 2;
    while m < len {
        let (cos, _) = chain[chain.len() - 1];
        chain.push(half_angle(cos));
        m *= 2;
    }
    // powers[j] = exp(-2πi·2^j / len)
    let powers: Vec<Complex> = chain
        .iter()
        .rev()
        .map(|&(c, s)| Complex::new(c as i32, -s as i32))
        .collect();

    (0..len / 2)
        .map(|k| {
            let mut acc = Complex::new(ONE as i32, 0);
            let mut bits = k;
            let mut j = 0;
            while bits != 0 {
                if bits & 1 == 1 {
                    acc = acc.mul_shift(powers[j], ROOT_BITS);
                }
                bits >>= 1;
                j += 1;
            }
            acc
        })
        .collect()
}
