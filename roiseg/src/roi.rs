//! Automatic region-of-interest extraction.
//!
//! Otsu threshold, keep the largest 8-connected foreground blob, then fill the
//! holes enclosed by it.

use crate::common::{IntensityGrid, Mask};
use crate::config::Connectivity;
use crate::labeling::ComponentMap;

const BINS: usize = 256;

/// 256 equal-width bins spanning the grid's own value range.
#[derive(Debug, Clone, Copy)]
struct Binning {
    min: f32,
    width: f32,
}

impl Binning {
    fn of(intensity: &IntensityGrid) -> Self {
        let (min, max) = intensity
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min < max {
            Self {
                min,
                width: (max - min) / BINS as f32,
            }
        } else {
            // Empty or constant image: everything lands in bin 0.
            Self {
                min: if min.is_finite() { min } else { 0.0 },
                width: 0.0,
            }
        }
    }

    /// Bin of `v`; the maximum falls in the last bin and NaN in bin 0.
    #[inline]
    fn bin(&self, v: f32) -> usize {
        if self.width == 0.0 {
            return 0;
        }
        (((v - self.min) / self.width) as usize).min(BINS - 1)
    }

    #[inline]
    fn center(&self, bin: usize) -> f32 {
        self.min + (bin as f32 + 0.5) * self.width
    }
}

/// Otsu's method on a 256-bin histogram over the grid's value range.
/// Returns the last bin of the background class.
fn otsu_bin(intensity: &IntensityGrid, binning: Binning) -> usize {
    let mut histogram = [0u64; BINS];
    for &v in intensity.iter() {
        histogram[binning.bin(v)] += 1;
    }

    let total = intensity.len() as f64;
    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    // A single occupied bin has no between-class variance; thresholding at it
    // leaves nothing above.
    let mut threshold = histogram.iter().position(|&c| c > 0).unwrap_or(0);
    let mut max_variance = 0.0;
    let mut weight_b = 0.0;
    let mut sum_b = 0.0;

    for (i, &count) in histogram.iter().enumerate() {
        weight_b += count as f64;
        if weight_b == 0.0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0.0 {
            break;
        }

        sum_b += i as f64 * count as f64;
        let mean_b = sum_b / weight_b;
        let mean_f = (sum - sum_b) / weight_f;
        let variance = weight_b * weight_f * (mean_b - mean_f).powi(2);

        if variance > max_variance {
            max_variance = variance;
            threshold = i;
        }
    }

    threshold
}

/// Otsu threshold in intensity units: the centre of the last background bin.
/// Pixels in higher bins are foreground.
pub fn otsu_threshold(intensity: &IntensityGrid) -> f32 {
    let binning = Binning::of(intensity);
    binning.center(otsu_bin(intensity, binning))
}

/// Keep only the largest connected component of `mask`. Equal areas resolve
/// to the component found first in raster order.
pub fn largest_component(mask: &Mask, connectivity: Connectivity) -> Mask {
    let components = ComponentMap::from_mask(mask, connectivity);
    let areas = components.areas();

    let mut best = 0usize;
    for (label, &area) in areas.iter().enumerate().skip(1) {
        if best == 0 || area > areas[best] {
            best = label;
        }
    }

    let labels = components.labels();
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        best != 0 && labels[(x, y)] as usize == best
    })
}

/// Set every unset pixel that cannot reach the image border through
/// 4-connected unset pixels.
pub fn fill_holes(mask: &Mask) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let background = Mask::from_fn(width, height, |x, y| !mask.get_xy(x, y));
    let components = ComponentMap::from_mask(&background, Connectivity::Four);
    let labels = components.labels();

    let mut touches_border = vec![false; components.num_components() + 1];
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                touches_border[labels[(x, y)] as usize] = true;
            }
        }
    }

    Mask::from_fn(width, height, |x, y| {
        let label = labels[(x, y)] as usize;
        label == 0 || !touches_border[label]
    })
}

/// Foreground mask for segmentation: Otsu threshold, largest 8-connected
/// component, holes filled. An image without foreground gives an empty mask.
pub fn extract_roi(intensity: &IntensityGrid) -> Mask {
    let binning = Binning::of(intensity);
    let threshold = otsu_bin(intensity, binning);
    let foreground = Mask::from_fn(intensity.width(), intensity.height(), |x, y| {
        binning.bin(intensity[(x, y)]) > threshold
    });

    let largest = largest_component(&foreground, Connectivity::Eight);
    let roi = fill_holes(&largest);

    tracing::debug!(
        "ROI: otsu bin {}, {} foreground pixels, {} after largest component + hole fill",
        threshold,
        foreground.count_ones(),
        roi.count_ones()
    );

    roi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Grid;
    use crate::testing::{Rect, mask_from_ascii, rect_image, rect_mask};

    #[test]
    fn test_otsu_splits_two_levels() {
        let image = rect_image(10, 10, 0.2, &[(Rect::new(2, 2, 8, 8), 0.8)]);
        let t = otsu_threshold(&image);
        assert!(t >= 0.19 && t < 0.8, "threshold {t}");
    }

    #[test]
    fn test_uniform_image_has_no_roi() {
        let image: IntensityGrid = Grid::new_filled(8, 8, 0.6);
        assert!(extract_roi(&image).is_all_false());
    }

    #[test]
    fn test_black_image_has_no_roi() {
        let image: IntensityGrid = Grid::new_default(8, 8);
        assert!(extract_roi(&image).is_all_false());
    }

    #[test]
    fn test_bright_square_is_roi() {
        let rect = Rect::new(3, 2, 9, 7);
        let image = rect_image(12, 10, 0.1, &[(rect, 0.9)]);
        assert_eq!(extract_roi(&image), rect_mask(12, 10, &[rect]));
    }

    #[test]
    fn test_only_largest_blob_survives() {
        let big = Rect::new(0, 0, 5, 5);
        let small = Rect::new(8, 8, 10, 10);
        let image = rect_image(12, 12, 0.0, &[(big, 1.0), (small, 1.0)]);
        assert_eq!(extract_roi(&image), rect_mask(12, 12, &[big]));
    }

    #[test]
    fn test_largest_component_tie_goes_to_first() {
        #[rustfmt::skip]
        let mask = mask_from_ascii(&[
            "##..##",
            "##..##",
        ]);
        let kept = largest_component(&mask, Connectivity::Eight);
        #[rustfmt::skip]
        let expected = mask_from_ascii(&[
            "##....",
            "##....",
        ]);
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_diagonal_blobs_join_under_eight_connectivity() {
        #[rustfmt::skip]
        let mask = mask_from_ascii(&[
            "##..",
            "##..",
            "..#.",
        ]);
        assert_eq!(largest_component(&mask, Connectivity::Eight), mask);
        assert_eq!(largest_component(&mask, Connectivity::Four).count_ones(), 4);
    }

    #[test]
    fn test_enclosed_hole_is_filled() {
        #[rustfmt::skip]
        let ring = mask_from_ascii(&[
            ".....",
            ".###.",
            ".#.#.",
            ".###.",
            ".....",
        ]);
        let filled = fill_holes(&ring);
        assert!(filled.get_xy(2, 2));
        assert_eq!(filled.count_ones(), 9);
    }

    #[test]
    fn test_notch_open_to_border_is_not_filled() {
        #[rustfmt::skip]
        let notch = mask_from_ascii(&[
            "#.#",
            "#.#",
            "###",
        ]);
        assert_eq!(fill_holes(&notch), notch);
    }

    #[test]
    fn test_low_contrast_image_uses_its_own_range() {
        // Both levels share one bin on a fixed [0, 1] scale.
        let rect = Rect::new(3, 2, 9, 7);
        let image = rect_image(12, 10, 0.5, &[(rect, 0.501)]);
        let t = otsu_threshold(&image);
        assert!(t > 0.5 && t < 0.501, "threshold {t}");
        assert_eq!(extract_roi(&image), rect_mask(12, 10, &[rect]));
    }

    #[test]
    fn test_threshold_is_bin_center_in_intensity_units() {
        let image = rect_image(4, 4, 0.25, &[(Rect::new(0, 0, 2, 4), 0.75)]);
        // bins are 0.5 / 256 wide starting at 0.25; the dark class is bin 0
        let expected = 0.25 + 0.5 * 0.5 / 256.0;
        assert!((otsu_threshold(&image) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ring_with_dark_center_becomes_disk() {
        let outer = Rect::new(1, 1, 9, 9);
        let inner = Rect::new(3, 3, 7, 7);
        let image = rect_image(10, 10, 0.0, &[(outer, 1.0), (inner, 0.0)]);
        assert_eq!(extract_roi(&image), rect_mask(10, 10, &[outer]));
    }
}
