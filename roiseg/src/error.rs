//! Error and warning types for the segmentation pipeline.

use std::fmt;

use thiserror::Error;

use crate::common::Shape;

/// Fatal errors. All of them are raised before any stage computes anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("quantization level count must be at least 1")]
    ZeroLevels,

    #[error("quantization level count must be at most 256, got {0}")]
    TooManyLevels(usize),

    #[error("cluster count must be at least 1")]
    ZeroClusters,

    #[error("cluster count {clusters} exceeds the number of distinct pixels ({pixels})")]
    TooManyClusters { clusters: usize, pixels: usize },

    #[error("clustering needs at least one initialization")]
    ZeroInitializations,

    #[error("clustering needs at least one iteration")]
    ZeroIterations,

    #[error("clustering tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("max_parallel must be at least 1 when set")]
    ZeroParallelism,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`Error::ShapeMismatch`] unless both shapes agree.
pub(crate) fn ensure_same_shape(expected: Shape, actual: Shape) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Pipeline stage names used in warnings and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Refine,
    Prune,
    FinalCleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Refine => "roi refinement",
            Stage::Prune => "connectivity pruning",
            Stage::FinalCleanup => "final cleanup",
        };
        f.write_str(name)
    }
}

/// Non-fatal conditions reported alongside a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No foreground label survived the stage; later stages see an all-zero grid.
    EmptyResult { stage: Stage },
    /// `runs` initializations stopped at the iteration cap before converging.
    NotConverged { runs: usize, max_iterations: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyResult { stage } => {
                write!(f, "no foreground regions remain after {stage}")
            }
            Warning::NotConverged {
                runs,
                max_iterations,
            } => write!(
                f,
                "{runs} k-means initialization(s) did not converge \
                 within {max_iterations} iterations"
            ),
        }
    }
}
