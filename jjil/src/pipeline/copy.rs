use super::stage::Transform;
use crate::error::Result;
use crate::image::Image;

/// Passes its input through either aliased or deep-copied.
///
/// In shallow mode the output shares pixel and mask buffers with the pushed
/// image, so writes through either handle are visible through the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyStage {
    deep: bool,
}

impl CopyStage {
    pub fn shallow() -> Self {
        Self { deep: false }
    }

    pub fn deep() -> Self {
        Self { deep: true }
    }

    pub fn is_deep(&self) -> bool {
        self.deep
    }
}

impl Transform for CopyStage {
    const NAME: &'static str = "Copy";

    fn apply(&mut self, image: Image) -> Result<Image> {
        Ok(if self.deep {
            image.clone()
        } else {
            image.share()
        })
    }
}
