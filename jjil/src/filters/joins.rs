use crate::error::{Error, Result};
use crate::image::{clamp_i8, Gray8Image, Image, Plane, MASK_ACTIVE};
use crate::pipeline::Join;

/// Resolves the second operand of an in-place join.
///
/// When both operands alias one buffer the second is deep-copied so the
/// first can be written while the second is read.
fn detach<T: Clone>(first: &Plane<T>, second: &Plane<T>) -> Plane<T> {
    if first.shares_buffer(second) {
        second.clone()
    } else {
        second.share()
    }
}

/// Combines two gray images pixelwise, writing into the first.
fn combine_gray8<F>(stage: &'static str, first: Image, second: Image, f: F) -> Result<Image>
where
    F: Fn(i8, i8) -> i8,
{
    first.check_same_size(&second, stage)?;
    let a = first.as_gray8(stage)?;
    let b = detach(a, second.as_gray8(stage)?);

    let src = b.read();
    for (dst, &rhs) in a.write().iter_mut().zip(src.iter()) {
        *dst = f(*dst, rhs);
    }
    drop(src);

    Ok(first)
}

/// Saturating sum of two gray images.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Add;

impl Join for Gray8Add {
    const NAME: &'static str = "Gray8Add";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        combine_gray8(Self::NAME, first, second, |a, b| a.saturating_add(b))
    }
}

/// Saturating difference `first - second`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Subtract;

impl Join for Gray8Subtract {
    const NAME: &'static str = "Gray8Subtract";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        combine_gray8(Self::NAME, first, second, |a, b| {
            clamp_i8(a as i32 - b as i32)
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Max;

impl Join for Gray8Max {
    const NAME: &'static str = "Gray8Max";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        combine_gray8(Self::NAME, first, second, i8::max)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Min;

impl Join for Gray8Min {
    const NAME: &'static str = "Gray8Min";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        combine_gray8(Self::NAME, first, second, i8::min)
    }
}

/// Integer quotient `first / second` of two 32-bit images.
///
/// A zero divisor or an out-of-range quotient fails the whole join before
/// the first image is touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray32Divide;

impl Join for Gray32Divide {
    const NAME: &'static str = "Gray32Divide";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        first.check_same_size(&second, Self::NAME)?;
        let a = first.as_gray32(Self::NAME)?;
        let b = detach(a, second.as_gray32(Self::NAME)?);

        let divisors = b.read();
        if let Some(pos) = divisors.iter().position(|&d| d == 0) {
            return Err(Error::divide_by_zero(format!(
                "{}: zero divisor at ({}, {})",
                Self::NAME,
                pos % b.width(),
                pos / b.width()
            )));
        }
        let overflow = a
            .read()
            .iter()
            .zip(divisors.iter())
            .position(|(&n, &d)| n.checked_div(d).is_none());
        if let Some(pos) = overflow {
            return Err(Error::overflow(format!(
                "{}: quotient out of range at ({}, {})",
                Self::NAME,
                pos % b.width(),
                pos / b.width()
            )));
        }
        for (dst, &d) in a.write().iter_mut().zip(divisors.iter()) {
            *dst /= d;
        }
        drop(divisors);

        Ok(first)
    }
}

/// Attaches the second gray image to the first as its mask.
///
/// Mask samples other than [`MASK_ACTIVE`] mark pixels as masked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8AttachMask;

impl Join for Gray8AttachMask {
    const NAME: &'static str = "Gray8AttachMask";

    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        first.check_same_size(&second, Self::NAME)?;
        first.as_gray8(Self::NAME)?;
        let mask: Gray8Image = second.into_gray8(Self::NAME)?;
        let masked = mask.read().iter().filter(|&&v| v != MASK_ACTIVE).count();
        tracing::trace!("{}: {} masked pixels", Self::NAME, masked);
        first.with_mask(mask)
    }
}
