//! Stage abstraction and composite stages.

mod config;
mod copy;
mod ladder;
mod sequence;
mod stage;

#[cfg(test)]
mod tests;

pub use config::{PipelineConfig, StageConfig};
pub use copy::CopyStage;
pub use ladder::{Join, Ladder};
pub use sequence::Sequence;
pub use stage::{OutputSlot, PipelineStage, Stage, Transform};
