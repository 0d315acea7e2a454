//! Connectivity pruning: split labels into connected blobs and drop small ones.

use crate::common::LabelGrid;
use crate::config::Connectivity;
use crate::labeling::{ComponentMap, relabel_by};

/// Drop connected components smaller than `min_size` and relabel survivors.
///
/// Each input label is split into its connected components, so blobs that
/// shared a label but do not touch come out as distinct labels. Survivors are
/// numbered `1..=n` in raster order of their first pixel.
pub fn prune_small_regions(
    labels: &LabelGrid,
    min_size: usize,
    connectivity: Connectivity,
) -> LabelGrid {
    let components = ComponentMap::from_labels(labels, connectivity);
    let areas = components.areas();
    let component_labels = components.labels();

    let (pruned, kept) = relabel_by(labels.shape(), |idx| {
        let component = component_labels[idx];
        (component != 0 && areas[component as usize] >= min_size).then_some(component)
    });

    tracing::debug!(
        "Pruning (min_size={}) kept {} of {} connected components",
        min_size,
        kept,
        components.num_components()
    );

    pruned
}
