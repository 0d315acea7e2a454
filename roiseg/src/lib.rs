//! Roiseg - region segmentation of grayscale images inside a region of interest.
//!
//! The pipeline clusters pixels by intensity and position, restricts the
//! clusters to a foreground mask, splits them into connected regions, merges
//! touching regions that share a dominant intensity level and drops whatever
//! is too small to matter.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use roiseg::{Config, Segmenter, extract_roi, resize_nearest};
//!
//! let roi = extract_roi(&intensity);
//! let segmenter = Segmenter::from_config(Config::default().with_seed(0));
//! let result = segmenter.segment(&intensity, &roi)?;
//!
//! let full_size = resize_nearest(&result.labels, input_width, input_height);
//! println!("Found {} regions", result.region_count());
//! ```

pub mod clustering;
pub mod common;
pub mod config;
pub mod error;
pub mod labeling;
pub mod quantize;
pub mod rescale;
pub mod roi;
pub mod segmenter;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Grids
// ============================================================================

pub use common::{Grid, IntensityGrid, LabelGrid, LevelGrid, Mask, Shape};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{ClusterConfig, Config, Connectivity};
pub use error::{Error, Result, Stage, Warning};

// ============================================================================
// Pipeline
// ============================================================================

pub use clustering::{Clustering, cluster};
pub use labeling::{ComponentMap, relabel_by};
pub use quantize::quantize;
pub use rescale::resize_nearest;
pub use roi::{extract_roi, fill_holes, largest_component, otsu_threshold};
pub use segmenter::{Segmentation, SegmentationDiagnostics, Segmenter};
pub use stages::{
    ModeTable, merge_adjacent_regions, mode_equal_edges, prune_small_regions, refine_to_roi,
    region_modes,
};
