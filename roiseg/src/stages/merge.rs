//! Adjacency merge: fuse touching regions that share a dominant level.
//!
//! Nodes of the adjacency graph are the labels present in the grid. Two labels
//! are joined by an edge when some pixel of one is a 4-neighbor of a pixel of
//! the other and both regions have the same mode. Every connected component of
//! that graph becomes one output region.
//!
//! Edges are collected by visiting each pixel's right and down neighbor once,
//! so opposite image borders never touch.


use crate::common::LabelGrid;
use crate::labeling::UnionFind;

use super::modes::ModeTable;

/// Label pairs `(a, b)` with `a < b` that are 4-adjacent and mode-equal.
/// Sorted, without duplicates.
pub fn mode_equal_edges(labels: &LabelGrid, modes: &ModeTable) -> Vec<(u32, u32)> {
    let width = labels.width();
    let height = labels.height();
    let mut edges = Vec::new();

    let mut visit = |a: u32, b: u32| {
        if a != 0 && b != 0 && a != b {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            if let (Some(ma), Some(mb)) = (modes.get(lo), modes.get(hi))
                && ma == mb
            {
                edges.push((lo, hi));
            }
        }
    };

    for y in 0..height {
        let row = labels.row(y);
        for x in 0..width {
            let here = row[x];
            if x + 1 < width {
                visit(here, row[x + 1]);
            }
            if y + 1 < height {
                visit(here, labels[(x, y + 1)]);
            }
        }
    }

    edges.sort_unstable();
    edges.dedup();
    edges
}

/// Merge every connected component of the adjacency graph into one label.
///
/// Output labels are `1..=n`, numbered in ascending order of each component's
/// smallest input label. Background stays 0.
pub fn merge_adjacent_regions(labels: &LabelGrid, modes: &ModeTable) -> LabelGrid {
    let max_label = labels.max_label() as usize;
    if max_label == 0 {
        return labels.clone();
    }

    let edges = mode_equal_edges(labels, modes);
    let mut uf = UnionFind::with_sets(max_label);
    for &(a, b) in &edges {
        uf.union(a, b);
    }

    // Only labels that actually occur are graph nodes; absent ones must not
    // consume an output id.
    let mut present = vec![false; max_label + 1];
    for &label in labels.iter() {
        present[label as usize] = true;
    }

    let mut component_id = vec![0u32; max_label + 1];
    let mut next = 0u32;
    for label in 1..=max_label as u32 {
        if !present[label as usize] {
            continue;
        }
        let root = uf.find(label) as usize;
        if component_id[root] == 0 {
            next += 1;
            component_id[root] = next;
        }
        component_id[label as usize] = component_id[root];
    }

    tracing::debug!(
        "Adjacency merge: {} edges, {} regions -> {}",
        edges.len(),
        present.iter().skip(1).filter(|&&p| p).count(),
        next
    );

    labels.map(|&label| component_id[label as usize])
}
