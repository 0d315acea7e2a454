//! Per-pixel feature vectors and their standardization.

use crate::common::IntensityGrid;

/// Feature vector `(intensity, row, column)`.
pub type Feature = [f64; 3];

/// Standardized pixel features in raster order.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub points: Vec<Feature>,
    /// Mean of the per-dimension variances after standardization. Scales the
    /// clustering tolerance.
    pub mean_variance: f64,
}

/// Build `(intensity, row, column)` features and scale each dimension to zero
/// mean and unit (population) variance. A constant dimension is only centred.
pub fn standardized_features(intensity: &IntensityGrid) -> FeatureSet {
    let width = intensity.width();
    let mut points: Vec<Feature> = intensity
        .iter()
        .enumerate()
        .map(|(idx, &v)| [v as f64, (idx / width) as f64, (idx % width) as f64])
        .collect();

    if points.is_empty() {
        return FeatureSet {
            points,
            mean_variance: 0.0,
        };
    }

    let n = points.len() as f64;
    let mut variances = [0.0f64; 3];
    for dim in 0..3 {
        let mean = points.iter().map(|p| p[dim]).sum::<f64>() / n;
        let var = points.iter().map(|p| (p[dim] - mean).powi(2)).sum::<f64>() / n;
        let scale = if var > f64::EPSILON { var.sqrt() } else { 1.0 };
        for p in points.iter_mut() {
            p[dim] = (p[dim] - mean) / scale;
        }
        variances[dim] = var / (scale * scale);
    }

    FeatureSet {
        points,
        mean_variance: variances.iter().sum::<f64>() / 3.0,
    }
}

#[inline]
pub(crate) fn squared_distance(a: &Feature, b: &Feature) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}
