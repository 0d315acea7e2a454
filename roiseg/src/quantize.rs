//! Intensity quantization into a small number of levels.

use crate::common::{IntensityGrid, LevelGrid};
use crate::config::validate_levels;
use crate::error::Result;

/// Map intensities in `[0, 1]` to levels `0..levels`.
///
/// Level is `floor(v * levels)`, with `v == 1.0` (and anything above) clamped
/// to the top level. Negative and NaN values map to level 0.
pub fn quantize(intensity: &IntensityGrid, levels: usize) -> Result<LevelGrid> {
    validate_levels(levels)?;

    let scale = levels as f32;
    let top = (levels - 1) as f32;
    // `as u8` saturates and maps NaN to 0
    Ok(intensity.map(|&v| (v * scale).floor().clamp(0.0, top) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Grid;
    use crate::error::Error;

    #[test]
    fn test_bucket_boundaries() {
        let intensity = Grid::new(6, 1, vec![0.0, 0.124, 0.125, 0.5, 0.999, 1.0]);
        let levels = quantize(&intensity, 8).unwrap();
        assert_eq!(levels.pixels(), &[0, 0, 1, 4, 7, 7]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let intensity = Grid::new(3, 1, vec![-0.5, 1.5, f32::NAN]);
        let levels = quantize(&intensity, 4).unwrap();
        assert_eq!(levels.pixels(), &[0, 3, 0]);
    }

    #[test]
    fn test_single_level() {
        let intensity = Grid::new(3, 1, vec![0.0, 0.5, 1.0]);
        let levels = quantize(&intensity, 1).unwrap();
        assert!(levels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_256_levels_fit_in_u8() {
        let intensity = Grid::new(2, 1, vec![1.0, 0.5]);
        let levels = quantize(&intensity, 256).unwrap();
        assert_eq!(levels.pixels(), &[255, 128]);
    }

    #[test]
    fn test_rejects_zero_levels() {
        let intensity = Grid::new(1, 1, vec![0.5]);
        assert_eq!(quantize(&intensity, 0), Err(Error::ZeroLevels));
    }

    #[test]
    fn test_shape_preserved() {
        let intensity: IntensityGrid = Grid::new_filled(5, 3, 0.3);
        assert_eq!(quantize(&intensity, 8).unwrap().shape(), intensity.shape());
    }
}
