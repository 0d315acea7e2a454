//! Pure label-grid transformations run by the segmenter after clustering.
//!
//! Every stage borrows its input and returns a fresh grid of the same shape.

pub mod merge;
pub mod modes;
pub mod prune;
pub mod refine;

pub use merge::{merge_adjacent_regions, mode_equal_edges};
pub use modes::{ModeTable, region_modes};
pub use prune::prune_small_regions;
pub use refine::refine_to_roi;
