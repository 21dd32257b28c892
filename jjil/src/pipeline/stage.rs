use crate::error::{Error, Result};
use crate::image::Image;

/// A unit of image work with a push-in / pull-out contract.
///
/// A stage holds at most one pending output. Stages are not reentrant; a
/// failed `push` leaves any previously produced output in place.
pub trait PipelineStage {
    /// Feeds one image into the stage.
    fn push(&mut self, image: Image) -> Result<()>;

    /// Takes the pending output, failing with [`Error::Empty`] if there is none.
    fn front(&mut self) -> Result<Image>;

    /// True when no output is available.
    fn is_empty(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// A one-in / one-out image operator.
///
/// Wrap it in a [`Stage`] to obtain a [`PipelineStage`].
pub trait Transform {
    const NAME: &'static str;

    fn apply(&mut self, image: Image) -> Result<Image>;

    fn into_stage(self) -> Stage<Self>
    where
        Self: Sized,
    {
        Stage::new(self)
    }
}

/// Single-value output slot shared by every stage implementation.
#[derive(Debug, Default)]
pub struct OutputSlot {
    value: Option<Image>,
}

impl OutputSlot {
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Stores a value, replacing any existing one.
    pub fn set(&mut self, image: Image) {
        self.value = Some(image);
    }

    /// Takes the value, leaving the slot empty.
    pub fn take(&mut self, stage: &'static str) -> Result<Image> {
        self.value.take().ok_or(Error::Empty { stage })
    }

    pub fn peek(&self) -> Option<&Image> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// [`PipelineStage`] adapter around a [`Transform`].
#[derive(Debug)]
pub struct Stage<T> {
    transform: T,
    output: OutputSlot,
}

impl<T: Transform> Stage<T> {
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            output: OutputSlot::new(),
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    /// Borrows the pending output without taking it.
    pub fn peek(&self) -> Option<&Image> {
        self.output.peek()
    }
}

impl<T: Transform> PipelineStage for Stage<T> {
    fn push(&mut self, image: Image) -> Result<()> {
        let result = self.transform.apply(image)?;
        self.output.set(result);
        Ok(())
    }

    fn front(&mut self) -> Result<Image> {
        self.output.take(T::NAME)
    }

    fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    fn name(&self) -> &'static str {
        T::NAME
    }
}

impl<S: PipelineStage + ?Sized> PipelineStage for Box<S> {
    fn push(&mut self, image: Image) -> Result<()> {
        (**self).push(image)
    }

    fn front(&mut self) -> Result<Image> {
        (**self).front()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
