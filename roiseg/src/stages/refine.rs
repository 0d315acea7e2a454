//! ROI refinement: drop clusters outside the mask and renumber the rest.

use crate::common::{LabelGrid, Mask};
use crate::error::{Result, ensure_same_shape};
use crate::labeling::relabel_by;

/// Zero every pixel outside `roi` and renumber the remaining cluster ids to
/// `1..=n` in raster order of first appearance.
///
/// Raw cluster ids start at 0, so the id itself is the grouping key and the
/// mask alone decides what becomes background.
pub fn refine_to_roi(clusters: &LabelGrid, roi: &Mask) -> Result<LabelGrid> {
    ensure_same_shape(clusters.shape(), roi.shape())?;

    let (refined, count) = relabel_by(clusters.shape(), |idx| {
        roi.get(idx).then(|| clusters[idx])
    });

    tracing::debug!(
        "ROI refinement kept {} of {} pixels in {} clusters",
        roi.count_ones(),
        roi.len(),
        count
    );

    Ok(refined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Shape;
    use crate::error::Error;
    use crate::testing::{
        assert_background_matches, assert_contiguous, label_grid, mask_from_ascii,
    };

    #[test]
    fn test_outside_roi_becomes_background() {
        #[rustfmt::skip]
        let clusters = label_grid(&[
            &[5, 5, 0, 3],
            &[5, 2, 0, 3],
        ]);
        #[rustfmt::skip]
        let roi = mask_from_ascii(&[
            ".###",
            "##.#",
        ]);
        let refined = refine_to_roi(&clusters, &roi).unwrap();
        assert_background_matches(&refined, &roi);
        assert_contiguous(&refined);
        // first seen: 5 -> 1, 0 -> 2, 3 -> 3, 2 -> 4
        assert_eq!(refined.pixels(), &[0, 1, 2, 3, 1, 4, 0, 3]);
    }

    #[test]
    fn test_cluster_zero_inside_roi_keeps_its_own_label() {
        let clusters = label_grid(&[&[0, 0, 1, 1]]);
        let roi = mask_from_ascii(&["####"]);
        let refined = refine_to_roi(&clusters, &roi).unwrap();
        assert_eq!(refined.pixels(), &[1, 1, 2, 2]);
    }

    #[test]
    fn test_empty_roi_gives_all_background() {
        let clusters = label_grid(&[&[1, 2, 3], &[4, 5, 6]]);
        let roi = Mask::new_default(3, 2);
        let refined = refine_to_roi(&clusters, &roi).unwrap();
        assert!(refined.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let clusters = label_grid(&[&[1, 2, 3]]);
        let roi = Mask::new_filled(2, 2, true);
        assert_eq!(
            refine_to_roi(&clusters, &roi),
            Err(Error::ShapeMismatch {
                expected: Shape::new(3, 1),
                actual: Shape::new(2, 2),
            })
        );
    }
}
