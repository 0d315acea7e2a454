//! Synthetic inputs and invariant checks shared by unit tests.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::common::{Grid, IntensityGrid, LabelGrid, Mask};
use crate::config::Connectivity;
use crate::labeling::ComponentMap;

/// Label grid from literal rows.
pub fn label_grid(rows: &[&[u32]]) -> LabelGrid {
    grid_from_rows(rows)
}

/// Any grid from literal rows; all rows must have the same length.
pub fn grid_from_rows<T: Copy>(rows: &[&[T]]) -> Grid<T> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    let mut pixels = Vec::with_capacity(width * height);
    for row in rows {
        assert_eq!(row.len(), width, "ragged rows");
        pixels.extend_from_slice(row);
    }
    Grid::new(width, height, pixels)
}

/// Mask from rows of `'#'` (set) and `'.'` (clear).
pub fn mask_from_ascii(rows: &[&str]) -> Mask {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    let data: Vec<bool> = rows
        .iter()
        .flat_map(|r| {
            assert_eq!(r.len(), width, "ragged rows");
            r.chars().map(|c| c == '#')
        })
        .collect();
    Mask::from_slice(width, height, &data)
}

/// Axis-aligned rectangle, `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Rect {
    pub fn new(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }
}

/// Constant background with rectangles painted at their own intensity.
/// Later rectangles paint over earlier ones.
pub fn rect_image(
    width: usize,
    height: usize,
    background: f32,
    rects: &[(Rect, f32)],
) -> IntensityGrid {
    Grid::from_fn(width, height, |x, y| {
        rects
            .iter()
            .rev()
            .find(|(r, _)| r.contains(x, y))
            .map_or(background, |&(_, v)| v)
    })
}

/// Mask covering the union of the given rectangles.
pub fn rect_mask(width: usize, height: usize, rects: &[Rect]) -> Mask {
    Mask::from_fn(width, height, |x, y| rects.iter().any(|r| r.contains(x, y)))
}

/// Add seeded uniform noise of amplitude `amount`, clamped to [0, 1].
pub fn add_noise(image: &IntensityGrid, amount: f32, seed: u64) -> IntensityGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    image.map(|&v| (v + rng.random_range(-amount..=amount)).clamp(0.0, 1.0))
}

// ============================================================================
// Invariant checks
// ============================================================================

/// Non-zero labels are exactly `1..=N`.
pub fn assert_contiguous(labels: &LabelGrid) {
    let areas = labels.label_areas();
    for (label, &area) in areas.iter().enumerate().skip(1) {
        assert!(area > 0, "label {label} is missing from 1..={}", areas.len() - 1);
    }
}

/// Every non-zero label forms a single connected component.
pub fn assert_connected(labels: &LabelGrid, connectivity: Connectivity) {
    let components = ComponentMap::from_labels(labels, connectivity);
    assert_eq!(
        components.num_components(),
        labels.region_count(),
        "some label spans more than one connected component"
    );
}

/// Foreground pixels are exactly the set pixels of `mask`.
pub fn assert_background_matches(labels: &LabelGrid, mask: &Mask) {
    for (idx, &label) in labels.iter().enumerate() {
        assert_eq!(
            label != 0,
            mask.get(idx),
            "pixel {idx} has label {label} but mask bit {}",
            mask.get(idx)
        );
    }
}

/// Foreground of `after` is a subset of foreground of `before`.
pub fn assert_foreground_subset(after: &LabelGrid, before: &LabelGrid) {
    for (idx, (&a, &b)) in after.iter().zip(before.iter()).enumerate() {
        assert!(b != 0 || a == 0, "pixel {idx} became foreground");
    }
}

/// Foreground mask of a label grid.
pub fn foreground_mask(labels: &LabelGrid) -> Mask {
    let data: Vec<bool> = labels.iter().map(|&l| l != 0).collect();
    Mask::from_slice(labels.width(), labels.height(), &data)
}
