use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are at least those of `other`.
    pub fn contains(&self, other: Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle with inclusive corner accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning a single point.
    pub const fn from_point(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// Inclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Inclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Grows the rectangle to include `(x, y)`.
    pub fn add_point(&mut self, x: i32, y: i32) {
        let left = self.x.min(x);
        let top = self.y.min(y);
        let right = self.right().max(x);
        let bottom = self.bottom().max(y);
        *self = Self::new(left, top, right - left + 1, bottom - top + 1);
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.x,
            self.y,
            self.right(),
            self.bottom()
        )
    }
}
