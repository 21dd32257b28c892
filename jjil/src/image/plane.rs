use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Size;
use crate::error::{Error, Result};

/// Fixed-size 2D pixel buffer.
///
/// The buffer lives behind a shared lock so that [`Plane::share`] can hand out
/// a second handle onto the same pixels; writes through either handle are
/// visible through both. [`Clone`] always produces an independent deep copy.
pub struct Plane<T> {
    width: usize,
    height: usize,
    pixels: Arc<RwLock<Vec<T>>>,
}

impl<T> Plane<T> {
    pub fn from_vec(width: usize, height: usize, pixels: Vec<T>) -> Result<Self> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(Error::parameter(
                "Plane",
                "pixels",
                format!("length {} for {}x{}", pixels.len(), width, height),
            ));
        }

        Ok(Self {
            width,
            height,
            pixels: Arc::new(RwLock::new(pixels)),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Locks the pixels for reading.
    ///
    /// Do not hold a read guard while writing through an alias of this plane.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.pixels.read()
    }

    /// Locks the pixels for writing. Mutations are visible through every
    /// handle obtained from [`Plane::share`].
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.pixels.write()
    }

    /// Shallow copy: the returned plane aliases this plane's pixels.
    pub fn share(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: Arc::clone(&self.pixels),
        }
    }

    pub fn shares_buffer(&self, other: &Plane<T>) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Fails with [`Error::SizeMismatch`] unless `other` has the same dimensions.
    pub fn check_same_size<U>(&self, other: &Plane<U>, stage: &'static str) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::SizeMismatch {
                stage,
                expected: self.size(),
                found: other.size(),
            });
        }
        Ok(())
    }

    /// Builds a plane of the same size by evaluating `f` at every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        check_dimensions(width, height)?;
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::from_vec(width, height, pixels)
    }
}

impl<T: Copy> Plane<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Result<Self> {
        check_dimensions(width, height)?;
        Self::from_vec(width, height, vec![value; width * height])
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.read()[self.index(x, y)]
    }

    #[inline]
    pub fn set(&self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.write()[idx] = value;
    }

    pub fn fill(&self, value: T) {
        self.write().fill(value);
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.read().clone()
    }

    /// Copies `other`'s pixels into this plane.
    pub fn copy_from(&self, other: &Plane<T>) -> Result<()> {
        self.check_same_size(other, "Plane::copy_from")?;
        if self.shares_buffer(other) {
            return Ok(());
        }
        let src = other.read();
        self.write().copy_from_slice(&src);
        Ok(())
    }

    /// Maps every pixel into a new plane of the same size.
    pub fn map<U, F>(&self, f: F) -> Plane<U>
    where
        F: FnMut(&T) -> U,
    {
        let pixels: Vec<U> = self.read().iter().map(f).collect();
        Plane {
            width: self.width,
            height: self.height,
            pixels: Arc::new(RwLock::new(pixels)),
        }
    }
}

impl<T: Copy + Default> Plane<T> {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::new_filled(width, height, T::default())
    }
}

impl<T: Clone> Clone for Plane<T> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: Arc::new(RwLock::new(self.read().clone())),
        }
    }
}

impl<T: PartialEq> PartialEq for Plane<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }
        if self.shares_buffer(other) {
            return true;
        }
        *self.read() == *other.read()
    }
}

impl<T> fmt::Debug for Plane<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plane")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("shared", &(Arc::strong_count(&self.pixels) > 1))
            .finish()
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::parameter(
            "Plane",
            "size",
            format!("{}x{}", width, height),
        ));
    }
    Ok(())
}
