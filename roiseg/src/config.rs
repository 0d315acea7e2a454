//! Configuration types for the segmentation pipeline.
//!
//! [`Config`] is flat, with fields grouped by comments into pipeline stages.
//! The clustering parameters live in [`ClusterConfig`] because the clusterer is
//! also usable on its own.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Enums
// ============================================================================

/// Pixel connectivity for connected component labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Only horizontal and vertical neighbors: (x±1, y) and (x, y±1).
    #[default]
    Four,
    /// All 8 surrounding pixels, diagonals included.
    Eight,
}

// ============================================================================
// Clustering
// ============================================================================

/// K-means parameters for the feature clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters K.
    pub clusters: usize,
    /// Independent k-means++ initializations; the lowest inertia run is kept.
    pub n_init: usize,
    /// Convergence threshold on the summed squared centroid shift, relative to
    /// the mean feature variance.
    pub tolerance: f64,
    /// Lloyd iteration cap per initialization.
    pub max_iterations: usize,
    /// Base seed. Initialization `i` uses `seed + i`. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Upper bound on initializations evaluated at once. `None` = no bound.
    pub max_parallel: Option<usize>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: 80,
            n_init: 10,
            tolerance: 1e-4,
            max_iterations: 300,
            seed: None,
            max_parallel: None,
        }
    }
}

impl ClusterConfig {
    /// Validate parameters that do not depend on the input.
    pub fn validate(&self) -> Result<()> {
        if self.clusters == 0 {
            return Err(Error::ZeroClusters);
        }
        if self.n_init == 0 {
            return Err(Error::ZeroInitializations);
        }
        if self.max_iterations == 0 {
            return Err(Error::ZeroIterations);
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidTolerance(self.tolerance));
        }
        if self.max_parallel == Some(0) {
            return Err(Error::ZeroParallelism);
        }
        Ok(())
    }

    /// Validate against the number of pixels that will be clustered.
    pub fn validate_for(&self, pixels: usize) -> Result<()> {
        self.validate()?;
        if self.clusters > pixels {
            return Err(Error::TooManyClusters {
                clusters: self.clusters,
                pixels,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Parameters for the full segmentation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Quantization
    /// Number of intensity levels Q used for region modes.
    pub levels: usize,

    // Clustering
    pub clustering: ClusterConfig,

    // Pruning
    /// Connected components smaller than this are dropped before merging.
    pub min_region_size: usize,
    /// Connected components smaller than this are dropped after merging.
    pub final_min_region_size: usize,
    /// Neighborhood used when splitting labels into connected components.
    pub connectivity: Connectivity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels: 8,
            clustering: ClusterConfig::default(),
            min_region_size: 20,
            final_min_region_size: 10,
            connectivity: Connectivity::Four,
        }
    }
}

impl Config {
    /// Validate parameters that do not depend on the input.
    pub fn validate(&self) -> Result<()> {
        validate_levels(self.levels)?;
        self.clustering.validate()
    }

    /// Same preset with a fixed clustering seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.clustering.seed = Some(seed);
        self
    }
}

pub(crate) fn validate_levels(levels: usize) -> Result<()> {
    if levels == 0 {
        return Err(Error::ZeroLevels);
    }
    if levels > u8::MAX as usize + 1 {
        return Err(Error::TooManyLevels(levels));
    }
    Ok(())
}
