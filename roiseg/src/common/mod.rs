//! Grid containers and shared utilities.

pub mod grid;
pub mod mask;
pub(crate) mod parallel;

pub use grid::{Grid, IntensityGrid, LabelGrid, LevelGrid, Shape};
pub use mask::Mask;
