use glam::IVec2;

use crate::error::{Error, Result};
use crate::image::{Gray8Image, Image, Size};
use crate::math::round_shift;
use crate::pipeline::Transform;

/// Fractional bits of the matrix coefficients.
pub const AFFINE_BITS: u32 = 16;

/// Sample written where the mapping lands outside the source.
const FILL: i8 = 0;

/// Fixed-point 2x3 affine map `(x, y) -> (a·x + b·y + c, d·x + e·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affine {
    a: i64,
    b: i64,
    c: i64,
    d: i64,
    e: i64,
    f: i64,
}

/// Division rounding half away from zero.
fn div_round(n: i64, d: i64) -> i64 {
    let q = n / d;
    let r = n % d;
    if 2 * r.abs() >= d.abs() {
        q + n.signum() * d.signum()
    } else {
        q
    }
}

fn cross(a: IVec2, b: IVec2) -> i64 {
    a.x as i64 * b.y as i64 - a.y as i64 * b.x as i64
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1 << AFFINE_BITS,
        b: 0,
        c: 0,
        d: 0,
        e: 1 << AFFINE_BITS,
        f: 0,
    };

    /// The map sending each `from[i]` to `to[i]`.
    ///
    /// Fails with [`Error::DivideByZero`] when `from` is degenerate.
    pub fn from_triangles(from: [IVec2; 3], to: [IVec2; 3]) -> Result<Self> {
        let (u1, u2) = (from[1] - from[0], from[2] - from[0]);
        let (v1, v2) = (to[1] - to[0], to[2] - to[0]);
        let det = cross(u1, u2);
        if det == 0 {
            return Err(Error::divide_by_zero(format!(
                "collinear triangle {:?} {:?} {:?}",
                from[0], from[1], from[2]
            )));
        }

        let one = 1i64 << AFFINE_BITS;
        let solve = |p: i64| div_round(p * one, det);
        let (v1x, v1y, v2x, v2y) = (v1.x as i64, v1.y as i64, v2.x as i64, v2.y as i64);
        let (u1x, u1y, u2x, u2y) = (u1.x as i64, u1.y as i64, u2.x as i64, u2.y as i64);

        let a = solve(v1x * u2y - v2x * u1y);
        let b = solve(v2x * u1x - v1x * u2x);
        let d = solve(v1y * u2y - v2y * u1y);
        let e = solve(v2y * u1x - v1y * u2x);

        let (s0x, s0y) = (from[0].x as i64, from[0].y as i64);
        let c = to[0].x as i64 * one - (a * s0x + b * s0y);
        let f = to[0].y as i64 * one - (d * s0x + e * s0y);

        Ok(Self { a, b, c, d, e, f })
    }

    /// Image of `(x, y)`, rounded to the nearest integer point.
    pub fn apply(&self, x: i32, y: i32) -> IVec2 {
        let (x, y) = (x as i64, y as i64);
        IVec2::new(
            round_shift(self.a * x + self.b * y + self.c, AFFINE_BITS) as i32,
            round_shift(self.d * x + self.e * y + self.f, AFFINE_BITS) as i32,
        )
    }
}

/// True when `p` lies inside or on the edge of the triangle.
fn in_triangle(p: IVec2, t: &[IVec2; 3]) -> bool {
    let s0 = cross(t[1] - t[0], p - t[0]);
    let s1 = cross(t[2] - t[1], p - t[1]);
    let s2 = cross(t[0] - t[2], p - t[2]);
    (s0 >= 0 && s1 >= 0 && s2 >= 0) || (s0 <= 0 && s1 <= 0 && s2 <= 0)
}

fn sample(src: &[i8], size: Size, p: IVec2) -> i8 {
    if p.x < 0 || p.y < 0 || p.x as usize >= size.width || p.y as usize >= size.height {
        FILL
    } else {
        src[p.y as usize * size.width + p.x as usize]
    }
}

/// Warps the source triangle onto the destination triangle of a new image.
///
/// Output pixels outside the destination triangle, or whose preimage falls
/// outside the input, are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8TriangleMap {
    to: [IVec2; 3],
    /// Destination to source.
    inverse: Affine,
    output: Size,
}

impl Gray8TriangleMap {
    pub fn new(from: [IVec2; 3], to: [IVec2; 3], output: Size) -> Result<Self> {
        if output.width == 0 || output.height == 0 {
            return Err(Error::parameter(Self::NAME, "output size", output));
        }
        // both directions must be invertible
        Affine::from_triangles(from, to)?;
        Ok(Self {
            to,
            inverse: Affine::from_triangles(to, from)?,
            output,
        })
    }
}

impl Transform for Gray8TriangleMap {
    const NAME: &'static str = "Gray8TriangleMap";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let size = plane.size();
        let src = plane.read();
        let out = Gray8Image::from_fn(self.output.width, self.output.height, |x, y| {
            let p = IVec2::new(x as i32, y as i32);
            if in_triangle(p, &self.to) {
                sample(&src, size, self.inverse.apply(p.x, p.y))
            } else {
                FILL
            }
        })?;
        drop(src);
        Ok(Image::from(out))
    }
}

/// Warps a source quadrilateral onto the whole of a new rectangular image.
///
/// Corners run top-left, top-right, bottom-right, bottom-left; the quad is
/// split along the top-left to bottom-right diagonal into two triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8QuadMap {
    upper: Affine,
    lower: Affine,
    output: Size,
}

impl Gray8QuadMap {
    pub fn new(quad: [IVec2; 4], output: Size) -> Result<Self> {
        if output.width < 2 || output.height < 2 {
            return Err(Error::parameter(Self::NAME, "output size", output));
        }
        let (w, h) = (output.width as i32 - 1, output.height as i32 - 1);
        let [tl, tr, br, bl] = quad;
        let (otl, otr, obr, obl) = (
            IVec2::new(0, 0),
            IVec2::new(w, 0),
            IVec2::new(w, h),
            IVec2::new(0, h),
        );

        Affine::from_triangles([tl, tr, br], [otl, otr, obr])?;
        Affine::from_triangles([tl, br, bl], [otl, obr, obl])?;
        Ok(Self {
            upper: Affine::from_triangles([otl, otr, obr], [tl, tr, br])?,
            lower: Affine::from_triangles([otl, obr, obl], [tl, br, bl])?,
            output,
        })
    }
}

impl Transform for Gray8QuadMap {
    const NAME: &'static str = "Gray8QuadMap";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let size = plane.size();
        let src = plane.read();
        let (w, h) = (self.output.width as i64 - 1, self.output.height as i64 - 1);

        let out = Gray8Image::from_fn(self.output.width, self.output.height, |x, y| {
            // on or above the diagonal from (0, 0) to (w, h)
            let map = if x as i64 * h >= y as i64 * w {
                &self.upper
            } else {
                &self.lower
            };
            sample(&src, size, map.apply(x as i32, y as i32))
        })?;
        drop(src);
        Ok(Image::from(out))
    }
}
