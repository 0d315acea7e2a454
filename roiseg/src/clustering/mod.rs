//! K-means clustering of pixels on standardized `(intensity, row, column)`
//! features.
//!
//! Each of `n_init` initializations is seeded with greedy k-means++ from its
//! own deterministic RNG stream and refined with Lloyd iterations. The run with
//! the lowest inertia wins; equal inertias resolve to the earlier run, so the
//! result does not depend on how runs are scheduled.

#[cfg(test)]
mod tests;

mod features;
mod kmeans;

pub use features::{Feature, FeatureSet, standardized_features};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::common::{IntensityGrid, LabelGrid, parallel::par_map_bounded};
use crate::config::ClusterConfig;
use crate::error::Result;

/// Winning k-means run mapped back onto the image grid.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster id in `0..K` per pixel.
    pub labels: LabelGrid,
    /// Centroids in standardized feature space.
    pub centroids: Vec<Feature>,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
    /// Lloyd iterations used by the winning run.
    pub iterations: usize,
    /// Whether the winning run converged before the iteration cap.
    pub converged: bool,
    /// Number of initializations (winner included) that hit the cap.
    pub unconverged_runs: usize,
}

/// Cluster every pixel of `intensity` into `config.clusters` groups.
///
/// Fails when the configuration is invalid or asks for more clusters than
/// there are pixels.
pub fn cluster(intensity: &IntensityGrid, config: &ClusterConfig) -> Result<Clustering> {
    config.validate_for(intensity.len())?;

    let features = standardized_features(intensity);
    let tolerance = config.tolerance * features.mean_variance;
    let base_seed = config
        .seed
        .unwrap_or_else(|| ChaCha8Rng::from_os_rng().next_u64());

    let seeds: Vec<u64> = (0..config.n_init as u64)
        .map(|i| base_seed.wrapping_add(i))
        .collect();

    let mut runs = par_map_bounded(&seeds, config.max_parallel, |&seed| {
        kmeans::run_once(
            &features.points,
            config.clusters,
            config.max_iterations,
            tolerance,
            seed,
        )
    });

    let unconverged_runs = runs.iter().filter(|r| !r.converged).count();
    if unconverged_runs > 0 {
        tracing::warn!(
            "{unconverged_runs} of {} k-means runs hit the {} iteration cap",
            runs.len(),
            config.max_iterations
        );
    }

    // Strict `<` keeps the earliest run on ties.
    let mut best_index = 0;
    for (i, run) in runs.iter().enumerate().skip(1) {
        if run.inertia < runs[best_index].inertia {
            best_index = i;
        }
    }
    let best = runs.swap_remove(best_index);

    tracing::debug!(
        "K-means: k={}, n_init={}, best run {} inertia={:.4} after {} iterations",
        config.clusters,
        config.n_init,
        best_index,
        best.inertia,
        best.iterations
    );

    Ok(Clustering {
        labels: LabelGrid::new(intensity.width(), intensity.height(), best.assignments),
        centroids: best.centroids,
        inertia: best.inertia,
        iterations: best.iterations,
        converged: best.converged,
        unconverged_runs,
    })
}
