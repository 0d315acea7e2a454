use std::hash::Hash;

use hashbrown::HashMap;

use crate::common::{LabelGrid, Shape};

/// Build a label grid from a per-pixel grouping key.
///
/// `key_of(idx)` returns the group of pixel `idx`, or `None` for background.
/// Groups are numbered `1..=n` in the raster order in which they are first
/// seen. Returns the grid and `n`.
pub fn relabel_by<K, F>(shape: Shape, mut key_of: F) -> (LabelGrid, usize)
where
    K: Hash + Eq,
    F: FnMut(usize) -> Option<K>,
{
    let mut ids: HashMap<K, u32> = HashMap::new();
    let mut pixels = Vec::with_capacity(shape.len());

    for idx in 0..shape.len() {
        let label = match key_of(idx) {
            Some(key) => {
                let next = ids.len() as u32 + 1;
                *ids.entry(key).or_insert(next)
            }
            None => 0,
        };
        pixels.push(label);
    }

    (
        LabelGrid::new(shape.width, shape.height, pixels),
        ids.len(),
    )
}
