use super::map_gray8_in_place;
use crate::error::{Error, Result};
use crate::image::{clamp_i8, Image};
use crate::pipeline::Transform;

/// Negates every sample; `-128` saturates to `127`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Negate;

impl Transform for Gray8Negate {
    const NAME: &'static str = "Gray8Negate";

    fn apply(&mut self, image: Image) -> Result<Image> {
        map_gray8_in_place(&image, Self::NAME, i8::saturating_neg)?;
        Ok(image)
    }
}

/// Replaces each sample through a 256-entry table indexed by `sample + 128`.
#[derive(Debug, Clone)]
pub struct Gray8Lookup {
    table: [i8; 256],
}

impl Gray8Lookup {
    pub fn new(table: [i8; 256]) -> Self {
        Self { table }
    }

    /// Builds the table from a slice, which must hold exactly 256 entries.
    pub fn from_slice(table: &[i8]) -> Result<Self> {
        let table: [i8; 256] = table
            .try_into()
            .map_err(|_| Error::parameter(Self::NAME, "table", format!("{} entries", table.len())))?;
        Ok(Self::new(table))
    }

    pub fn table(&self) -> &[i8; 256] {
        &self.table
    }
}

impl Transform for Gray8Lookup {
    const NAME: &'static str = "Gray8Lookup";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let table = self.table;
        map_gray8_in_place(&image, Self::NAME, |v| table[(v as i32 + 128) as usize])?;
        Ok(image)
    }
}

/// Multiplies every sample by an integer factor, clamping to `[-128, 127]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gray8Mpy {
    factor: i32,
}

impl Gray8Mpy {
    pub fn new(factor: i32) -> Self {
        Self { factor }
    }

    pub fn factor(&self) -> i32 {
        self.factor
    }
}

impl Transform for Gray8Mpy {
    const NAME: &'static str = "Gray8Mpy";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let factor = self.factor;
        map_gray8_in_place(&image, Self::NAME, |v| {
            clamp_i8((v as i32).saturating_mul(factor))
        })?;
        Ok(image)
    }
}
