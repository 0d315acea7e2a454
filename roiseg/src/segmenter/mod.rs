//! End-to-end segmentation pipeline.
//!
//! [`Segmenter`] wraps a [`Config`] and runs quantization, clustering, ROI
//! refinement, pruning, mode extraction, adjacency merge and the final
//! cleanup on one intensity grid.


// =============================================================================
// Imports
// =============================================================================

use crate::clustering::cluster;
use crate::common::{IntensityGrid, LabelGrid, Mask};
use crate::config::Config;
use crate::error::{Result, Stage, Warning, ensure_same_shape};
use crate::quantize::quantize;
use crate::stages::{
    ModeTable, merge_adjacent_regions, prune_small_regions, refine_to_roi, region_modes,
};

/// Output of one segmentation run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Final labels: background 0, regions `1..=N`, each region connected.
    pub labels: LabelGrid,
    /// Clusters restricted to the ROI, before any pruning.
    pub refined: LabelGrid,
    /// Labels right after the adjacency merge.
    pub merged: LabelGrid,
    /// Region modes of the pruned labels that fed the merge.
    pub modes: ModeTable,
    pub diagnostics: SegmentationDiagnostics,
    /// Non-fatal conditions met along the way, in pipeline order.
    pub warnings: Vec<Warning>,
}

impl Segmentation {
    /// Number of regions in the final labels.
    pub fn region_count(&self) -> usize {
        self.diagnostics.final_regions
    }
}

/// Counts and clustering statistics from each stage.
#[derive(Debug, Clone, Default)]
pub struct SegmentationDiagnostics {
    /// Pixels inside the ROI mask.
    pub roi_pixels: usize,
    /// Distinct clusters present inside the ROI.
    pub refined_regions: usize,
    /// Connected regions that survived the first pruning.
    pub pruned_regions: usize,
    /// Regions after merging adjacent, mode-equal neighbours.
    pub merged_regions: usize,
    /// Regions after the final cleanup.
    pub final_regions: usize,
    /// Inertia of the winning k-means run.
    pub inertia: f64,
    /// Lloyd iterations of the winning run.
    pub iterations: usize,
    /// Whether the winning run converged.
    pub converged: bool,
}

// =============================================================================
// Segmenter
// =============================================================================

/// Segmenter bound to one configuration.
///
/// # Example
///
/// ```rust,ignore
/// use roiseg::{Config, Segmenter, extract_roi};
///
/// let roi = extract_roi(&intensity);
/// let segmenter = Segmenter::from_config(Config::default().with_seed(7));
/// let result = segmenter.segment(&intensity, &roi)?;
/// println!("{} regions", result.region_count());
/// ```
#[derive(Debug, Default)]
pub struct Segmenter {
    config: Config,
}

impl Segmenter {
    /// Segmenter with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Segment `intensity` inside `roi`.
    ///
    /// Configuration and shape problems fail before any stage runs. An empty
    /// ROI, or one whose regions are all pruned away, is not an error: the
    /// result is an all-background grid with an [`Warning::EmptyResult`].
    pub fn segment(&self, intensity: &IntensityGrid, roi: &Mask) -> Result<Segmentation> {
        let config = &self.config;
        config.validate()?;
        ensure_same_shape(intensity.shape(), roi.shape())?;
        config.clustering.validate_for(intensity.len())?;

        let mut warnings = Vec::new();
        let mut diagnostics = SegmentationDiagnostics {
            roi_pixels: roi.count_ones(),
            ..Default::default()
        };

        // Step 1: Quantize intensities for the mode stage
        let levels = quantize(intensity, config.levels)?;

        // Step 2: Cluster on (intensity, row, column)
        let clustering = cluster(intensity, &config.clustering)?;
        diagnostics.inertia = clustering.inertia;
        diagnostics.iterations = clustering.iterations;
        diagnostics.converged = clustering.converged;
        if clustering.unconverged_runs > 0 {
            push_warning(
                &mut warnings,
                Warning::NotConverged {
                    runs: clustering.unconverged_runs,
                    max_iterations: config.clustering.max_iterations,
                },
            );
        }

        // Step 3: Keep clusters inside the ROI
        let refined = refine_to_roi(&clustering.labels, roi)?;
        diagnostics.refined_regions = refined.region_count();
        check_empty(&refined, Stage::Refine, &mut warnings);

        // Step 4: Split into connected regions, drop small ones
        let pruned = prune_small_regions(&refined, config.min_region_size, config.connectivity);
        diagnostics.pruned_regions = pruned.region_count();
        check_empty(&pruned, Stage::Prune, &mut warnings);

        // Step 5: Merge adjacent regions sharing a dominant level
        let modes = region_modes(&pruned, &levels)?;
        let merged = merge_adjacent_regions(&pruned, &modes);
        diagnostics.merged_regions = merged.region_count();

        // Step 6: Final cleanup
        let labels =
            prune_small_regions(&merged, config.final_min_region_size, config.connectivity);
        diagnostics.final_regions = labels.region_count();
        check_empty(&labels, Stage::FinalCleanup, &mut warnings);

        tracing::info!(
            "Segmented {} ({} ROI pixels): {} clusters -> {} pruned -> {} merged -> {} final",
            intensity.shape(),
            diagnostics.roi_pixels,
            diagnostics.refined_regions,
            diagnostics.pruned_regions,
            diagnostics.merged_regions,
            diagnostics.final_regions
        );

        Ok(Segmentation {
            labels,
            refined,
            merged,
            modes,
            diagnostics,
            warnings,
        })
    }
}

fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}

/// Report the first stage that leaves no foreground. Later stages of an
/// already empty grid stay quiet.
fn check_empty(labels: &LabelGrid, stage: Stage, warnings: &mut Vec<Warning>) {
    let already_empty = warnings
        .iter()
        .any(|w| matches!(w, Warning::EmptyResult { .. }));
    if !already_empty && labels.foreground_count() == 0 {
        push_warning(warnings, Warning::EmptyResult { stage });
    }
}
