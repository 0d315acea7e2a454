//! Connected component labeling using union-find.
//!
//! Works on label grids rather than binary masks: a component is a maximal set
//! of pixels carrying the *same* non-zero label and reachable through the
//! chosen neighborhood. Binary masks are handled as a grid of 0/1 labels.
//!
//! - Run-length encoding per row (a run is a stretch of one repeated label)
//! - Runs are merged with overlapping same-label runs of the previous row
//! - Final labels are assigned in raster order of each component's first pixel


mod relabel;
mod union_find;

pub use relabel::relabel_by;
pub(crate) use union_find::UnionFind;

use crate::common::{LabelGrid, Mask};
use crate::config::Connectivity;

// ============================================================================
// Run-Length Encoding
// ============================================================================

/// A horizontal run of pixels sharing one non-zero input label.
#[derive(Debug, Clone, Copy)]
struct Run {
    start: u32, // first x (inclusive)
    end: u32,   // last x (exclusive)
    value: u32, // input label shared by every pixel of the run
    label: u32, // provisional component label
}

impl Run {
    /// Window of previous-row x positions that may touch this run.
    /// Returns (start, end) where end is exclusive.
    #[inline]
    fn search_window(&self, connectivity: Connectivity) -> (u32, u32) {
        match connectivity {
            Connectivity::Four => (self.start, self.end),
            Connectivity::Eight => (self.start.saturating_sub(1), self.end + 1),
        }
    }
}

/// Check if two runs from adjacent rows belong to the same component.
#[inline]
fn runs_connected(prev: &Run, curr: &Run, connectivity: Connectivity) -> bool {
    if prev.value != curr.value {
        return false;
    }
    match connectivity {
        Connectivity::Four => prev.start < curr.end && prev.end > curr.start,
        Connectivity::Eight => prev.start < curr.end + 1 && prev.end + 1 > curr.start,
    }
}

/// Split one row into runs of equal non-zero values.
fn extract_runs_from_row(row: impl Iterator<Item = u32>, runs: &mut Vec<Run>) {
    let mut open: Option<Run> = None;

    for (x, value) in row.enumerate() {
        let x = x as u32;
        if let Some(run) = open.as_mut()
            && run.value == value
        {
            run.end = x + 1;
            continue;
        }
        if let Some(run) = open.take() {
            runs.push(run);
        }
        if value != 0 {
            open = Some(Run {
                start: x,
                end: x + 1,
                value,
                label: 0,
            });
        }
    }

    if let Some(run) = open {
        runs.push(run);
    }
}

/// Merge the current row's runs with the previous row's via union-find.
///
/// Runs without a connected predecessor get a fresh provisional label.
fn merge_runs_with_prev(
    curr_runs: &mut [Run],
    prev_runs: &[Run],
    connectivity: Connectivity,
    uf: &mut UnionFind,
) {
    let mut prev_idx = 0;
    for run in curr_runs.iter_mut() {
        let (search_start, search_end) = run.search_window(connectivity);

        while prev_idx < prev_runs.len() && prev_runs[prev_idx].end <= search_start {
            prev_idx += 1;
        }

        let mut assigned_label = None;
        let mut check_idx = prev_idx;
        while check_idx < prev_runs.len() && prev_runs[check_idx].start < search_end {
            let prev_run = &prev_runs[check_idx];
            if runs_connected(prev_run, run, connectivity) {
                match assigned_label {
                    Some(label) if label != prev_run.label => uf.union(label, prev_run.label),
                    None => assigned_label = Some(prev_run.label),
                    _ => {}
                }
            }
            check_idx += 1;
        }

        run.label = assigned_label.unwrap_or_else(|| uf.make_set());
    }
}

// ============================================================================
// ComponentMap
// ============================================================================

/// Result of connected component analysis: one label per component,
/// numbered `1..=num_components` in raster order of first pixel.
#[derive(Debug, Clone)]
pub struct ComponentMap {
    labels: LabelGrid,
    num_components: usize,
}

impl ComponentMap {
    /// Split every non-zero label of `grid` into its connected components.
    pub fn from_labels(grid: &LabelGrid, connectivity: Connectivity) -> Self {
        let width = grid.width();
        let height = grid.height();
        let mut labels = LabelGrid::new_default(width, height);

        let num_components = label_rows(width, height, &mut labels, connectivity, |y, runs| {
            extract_runs_from_row(grid.row(y).iter().copied(), runs);
        });

        Self {
            labels,
            num_components,
        }
    }

    /// Connected components of the set pixels of a binary mask.
    pub fn from_mask(mask: &Mask, connectivity: Connectivity) -> Self {
        let width = mask.width();
        let height = mask.height();
        let mut labels = LabelGrid::new_default(width, height);

        let num_components = label_rows(width, height, &mut labels, connectivity, |y, runs| {
            let row_start = y * width;
            extract_runs_from_row(
                (row_start..row_start + width).map(|idx| mask.get(idx) as u32),
                runs,
            );
        });

        Self {
            labels,
            num_components,
        }
    }

    /// Number of connected components (excluding background).
    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    #[inline]
    pub fn labels(&self) -> &LabelGrid {
        &self.labels
    }

    #[inline]
    pub fn into_labels(self) -> LabelGrid {
        self.labels
    }

    /// Pixel count per component, indexed by component label (index 0 = background).
    pub fn areas(&self) -> Vec<usize> {
        let mut areas = vec![0usize; self.num_components + 1];
        for &label in self.labels.iter() {
            areas[label as usize] += 1;
        }
        areas
    }
}

/// Sequential run-based labeling shared by the grid and mask front ends.
fn label_rows(
    width: usize,
    height: usize,
    labels: &mut LabelGrid,
    connectivity: Connectivity,
    mut extract_row: impl FnMut(usize, &mut Vec<Run>),
) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }

    let mut uf = UnionFind::new();
    let mut prev_runs: Vec<Run> = Vec::with_capacity(width / 4);
    let mut curr_runs: Vec<Run> = Vec::with_capacity(width / 4);

    for y in 0..height {
        curr_runs.clear();
        extract_row(y, &mut curr_runs);

        if curr_runs.is_empty() {
            prev_runs.clear();
            continue;
        }

        merge_runs_with_prev(&mut curr_runs, &prev_runs, connectivity, &mut uf);

        let row_start = y * width;
        for run in &curr_runs {
            for x in run.start..run.end {
                labels[row_start + x as usize] = run.label;
            }
        }

        std::mem::swap(&mut prev_runs, &mut curr_runs);
    }

    uf.flatten_labels(labels.pixels_mut())
}
