//! 8-connected component labeling with union-find, largest-first ranking
//! and per-component perimeter.

mod conn_comp;
mod equivalence;
mod labeling;
mod ranking;


pub use conn_comp::Gray8ConnComp;
pub use equivalence::LabelingSession;
pub use labeling::{label_components, Labeling, BACKGROUND};
pub use ranking::{Component, ComponentRanking};
