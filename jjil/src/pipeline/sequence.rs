use super::stage::{OutputSlot, PipelineStage};
use crate::error::{Error, Result};
use crate::image::Image;

/// Ordered chain of stages; the output of each feeds the next.
#[derive(Default)]
pub struct Sequence {
    stages: Vec<Box<dyn PipelineStage>>,
    output: OutputSlot,
}

impl Sequence {
    pub const NAME: &'static str = "Sequence";

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage at the tail.
    pub fn add(&mut self, stage: impl PipelineStage + 'static) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn add_boxed(&mut self, stage: Box<dyn PipelineStage>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn with(mut self, stage: impl PipelineStage + 'static) -> Self {
        self.add(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl PipelineStage for Sequence {
    fn push(&mut self, image: Image) -> Result<()> {
        tracing::debug!(
            "Sequence: pushing {} {} image through {} stages",
            image.size(),
            image.format(),
            self.stages.len()
        );

        let mut current = image;
        for stage in self.stages.iter_mut() {
            stage.push(current)?;
            if stage.is_empty() {
                return Err(Error::Empty {
                    stage: stage.name(),
                });
            }
            current = stage.front()?;
        }

        self.output.set(current);
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

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("stages", &self.stage_names())
            .field("has_output", &!self.output.is_empty())
            .finish()
    }
}
