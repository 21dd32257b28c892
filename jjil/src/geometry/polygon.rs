use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::IVec2;

use crate::error::{Error, Result};
use crate::image::{Gray8Image, Image, MASK_ACTIVE, MASK_MASKED};
use crate::pipeline::Transform;

/// `ceil(n / d)` for `d > 0`.
fn ceil_div(n: i64, d: i64) -> i64 {
    n.div_euclid(d) + i64::from(n.rem_euclid(d) != 0)
}

/// Masks the pixels inside (or outside) a polygon using a scanline fill.
///
/// Pixel `(x, y)` is inside when its centre `(x + 0.5, y + 0.5)` is, under the
/// even/odd rule. Each edge covers the half-open row span `[min_y, max_y)`, so
/// horizontal edges contribute nothing and shared vertices are counted once.
/// Self-intersecting polygons are filled by the same even/odd rule.
///
/// With `inside` set the polygon interior is masked; otherwise everything
/// outside it is. Pixels already masked in the pushed image stay masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPolygon {
    vertices: Vec<IVec2>,
    inside: bool,
}

impl MaskPolygon {
    pub fn new(vertices: Vec<IVec2>, inside: bool) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::InvalidPolygon {
                reason: format!("{} vertices, at least 3 required", vertices.len()),
            });
        }
        let doubled_area: i64 = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum();
        if doubled_area == 0 {
            return Err(Error::InvalidPolygon {
                reason: "zero area".to_string(),
            });
        }
        Ok(Self { vertices, inside })
    }

    /// Axis-aligned rectangle covering pixels `x..x + width`, `y..y + height`.
    pub fn rect(x: i32, y: i32, width: i32, height: i32, inside: bool) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidPolygon {
                reason: format!("rectangle {}x{}", width, height),
            });
        }
        Self::new(
            vec![
                IVec2::new(x, y),
                IVec2::new(x + width, y),
                IVec2::new(x + width, y + height),
                IVec2::new(x, y + height),
            ],
            inside,
        )
    }

    pub fn quad(corners: [IVec2; 4], inside: bool) -> Result<Self> {
        Self::new(corners.to_vec(), inside)
    }

    pub fn vertices(&self) -> &[IVec2] {
        &self.vertices
    }

    pub fn inside(&self) -> bool {
        self.inside
    }

    /// Per row, the sorted first-pixel indices where the fill toggles.
    fn crossings(&self, height: usize) -> Vec<Vec<i64>> {
        let mut rows: Vec<BinaryHeap<Reverse<i64>>> = vec![BinaryHeap::new(); height];
        let n = self.vertices.len();

        for i in 0..n {
            let (mut p, mut q) = (self.vertices[i], self.vertices[(i + 1) % n]);
            if p.y == q.y {
                continue;
            }
            if p.y > q.y {
                std::mem::swap(&mut p, &mut q);
            }
            let (dx, dy) = ((q.x - p.x) as i64, (q.y - p.y) as i64);
            let first = p.y.max(0) as i64;
            let last = (q.y as i64).min(height as i64);

            for y in first..last {
                // crossing at row centre: x = p.x + (y + 0.5 - p.y) * dx / dy = num / (2 dy)
                let num = 2 * p.x as i64 * dy + (2 * y + 1 - 2 * p.y as i64) * dx;
                let den = 2 * dy;
                // first pixel whose centre is at or right of the crossing
                let start = ceil_div(2 * num - den, 2 * den);
                rows[y as usize].push(Reverse(start));
            }
        }

        rows.into_iter()
            .map(|mut heap| std::iter::from_fn(move || heap.pop().map(|Reverse(x)| x)).collect())
            .collect()
    }

    /// The mask this polygon produces for a `width x height` image.
    pub fn mask(&self, width: usize, height: usize) -> Result<Gray8Image> {
        let outside = if self.inside { MASK_ACTIVE } else { MASK_MASKED };
        let interior = if self.inside { MASK_MASKED } else { MASK_ACTIVE };
        let mask = Gray8Image::new_filled(width, height, outside)?;

        let mut pixels = mask.write();
        for (y, xs) in self.crossings(height).iter().enumerate() {
            for span in xs.chunks_exact(2) {
                let from = span[0].clamp(0, width as i64) as usize;
                let to = span[1].clamp(0, width as i64) as usize;
                if from < to {
                    pixels[y * width + from..y * width + to].fill(interior);
                }
            }
        }
        drop(pixels);
        Ok(mask)
    }
}

impl Transform for MaskPolygon {
    const NAME: &'static str = "MaskPolygon";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let size = image.size();
        let mask = self.mask(size.width, size.height)?;

        if let Some(existing) = image.mask() {
            let old = existing.read();
            for (m, &o) in mask.write().iter_mut().zip(old.iter()) {
                if o != MASK_ACTIVE {
                    *m = MASK_MASKED;
                }
            }
        }

        let masked = mask.read().iter().filter(|&&v| v != MASK_ACTIVE).count();
        tracing::debug!("{}: {} of {} pixels masked", Self::NAME, masked, size.area());
        image.with_mask(mask)
    }
}
