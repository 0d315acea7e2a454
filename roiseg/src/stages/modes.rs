//! Dominant quantized level per region.

use crate::common::{LabelGrid, LevelGrid};
use crate::error::{Result, ensure_same_shape};

/// Mode level of every label present in a label grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    // modes[label]; None for background and absent labels
    modes: Vec<Option<u8>>,
}

impl ModeTable {
    /// Mode of `label`, or `None` when the label is background or absent.
    #[inline]
    pub fn get(&self, label: u32) -> Option<u8> {
        self.modes.get(label as usize).copied().flatten()
    }

    /// Number of labels with a mode.
    pub fn len(&self) -> usize {
        self.modes.iter().filter(|m| m.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(label, mode)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.modes
            .iter()
            .enumerate()
            .filter_map(|(label, mode)| mode.map(|m| (label as u32, m)))
    }
}

/// Most frequent level under each non-zero label. Ties go to the lowest level.
pub fn region_modes(labels: &LabelGrid, levels: &LevelGrid) -> Result<ModeTable> {
    ensure_same_shape(labels.shape(), levels.shape())?;

    let num_labels = labels.max_label() as usize + 1;
    let mut histograms = vec![[0u32; 256]; num_labels];
    for (&label, &level) in labels.iter().zip(levels.iter()) {
        if label != 0 {
            histograms[label as usize][level as usize] += 1;
        }
    }

    let modes = histograms
        .iter()
        .enumerate()
        .map(|(label, histogram)| {
            if label == 0 {
                return None;
            }
            let (mode, &count) = histogram
                .iter()
                .enumerate()
                .fold((0, &0), |best, cur| if cur.1 > best.1 { cur } else { best });
            (count > 0).then_some(mode as u8)
        })
        .collect();

    Ok(ModeTable { modes })
}
