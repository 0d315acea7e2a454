//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use roiseg::prelude::*;
//! ```

// Grids
pub use crate::{IntensityGrid, LabelGrid, Mask};

// Pipeline
pub use crate::{Config, Segmentation, Segmenter, extract_roi, resize_nearest};

// Errors
pub use crate::{Error, Warning};
