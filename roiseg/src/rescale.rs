//! Nearest-neighbour resampling of label grids.

use crate::common::Grid;

/// Source index for destination index `dst` when mapping `src_len` samples to
/// `dst_len`: `floor((dst + 0.5) * src_len / dst_len)`, clamped.
#[inline]
fn source_index(dst: usize, src_len: usize, dst_len: usize) -> usize {
    let pos = ((dst as f64 + 0.5) * src_len as f64 / dst_len as f64).floor() as usize;
    pos.min(src_len - 1)
}

/// Resize `grid` to `width` x `height` by copying the nearest source pixel.
///
/// Values are never blended, so label ids survive unchanged. An empty source
/// yields a default-filled grid of the requested size.
pub fn resize_nearest<T: Copy + Default>(grid: &Grid<T>, width: usize, height: usize) -> Grid<T> {
    if grid.shape().is_empty() {
        return Grid::new_default(width, height);
    }

    let src_w = grid.width();
    let src_h = grid.height();
    let columns: Vec<usize> = (0..width).map(|x| source_index(x, src_w, width)).collect();

    Grid::from_fn(width, height, |x, y| {
        grid[(columns[x], source_index(y, src_h, height))]
    })
}
