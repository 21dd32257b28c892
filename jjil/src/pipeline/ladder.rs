use super::stage::{OutputSlot, PipelineStage};
use crate::error::{Error, Result};
use crate::image::Image;

/// Binary function combining the outputs of a [`Ladder`]'s two branches.
pub trait Join {
    const NAME: &'static str;

    fn join(&mut self, first: Image, second: Image) -> Result<Image>;
}

/// Object-safe view of [`Join`] used for boxing.
trait DynJoin {
    fn join(&mut self, first: Image, second: Image) -> Result<Image>;
    fn name(&self) -> &'static str;
}

impl<J: Join> DynJoin for J {
    fn join(&mut self, first: Image, second: Image) -> Result<Image> {
        Join::join(self, first, second)
    }

    fn name(&self) -> &'static str {
        J::NAME
    }
}

/// Fans one image out into two independent sub-pipelines and joins the results.
pub struct Ladder {
    first: Box<dyn PipelineStage>,
    second: Box<dyn PipelineStage>,
    join: Box<dyn DynJoin>,
    output: OutputSlot,
}

impl Ladder {
    pub const NAME: &'static str = "Ladder";

    pub fn new(
        first: impl PipelineStage + 'static,
        second: impl PipelineStage + 'static,
        join: impl Join + 'static,
    ) -> Self {
        Self {
            first: Box::new(first),
            second: Box::new(second),
            join: Box::new(join),
            output: OutputSlot::new(),
        }
    }

    pub fn join_name(&self) -> &'static str {
        self.join.name()
    }
}

impl PipelineStage for Ladder {
    fn push(&mut self, image: Image) -> Result<()> {
        // the second branch gets an independent deep copy
        let copy = image.clone();

        self.first.push(image)?;
        if self.first.is_empty() {
            return Err(Error::Empty {
                stage: self.first.name(),
            });
        }
        self.second.push(copy)?;
        if self.second.is_empty() {
            return Err(Error::Empty {
                stage: self.second.name(),
            });
        }

        let a = self.first.front()?;
        let b = self.second.front()?;

        tracing::debug!(
            "Ladder: joining {} and {} with {}",
            self.first.name(),
            self.second.name(),
            self.join.name()
        );

        let joined = self.join.join(a, b)?;
        self.output.set(joined);
        Ok(())
    }

    fn front(&mut self) -> Result<Image> {
        self.output.take(Self::NAME)
    }

    fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
