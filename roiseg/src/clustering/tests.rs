use super::kmeans::{kmeans_plus_plus, lloyd};
use super::*;
use crate::common::Grid;
use crate::error::Error;
use crate::testing::{Rect, add_noise, rect_image};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seeded(clusters: usize, seed: u64) -> ClusterConfig {
    ClusterConfig {
        clusters,
        seed: Some(seed),
        ..ClusterConfig::default()
    }
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_more_clusters_than_pixels_is_rejected() {
    let intensity: IntensityGrid = Grid::new_filled(4, 4, 0.5);
    let err = cluster(&intensity, &seeded(17, 0)).unwrap_err();
    assert_eq!(
        err,
        Error::TooManyClusters {
            clusters: 17,
            pixels: 16
        }
    );
}

#[test]
fn test_zero_clusters_is_rejected() {
    let intensity: IntensityGrid = Grid::new_filled(4, 4, 0.5);
    assert_eq!(cluster(&intensity, &seeded(0, 0)).unwrap_err(), Error::ZeroClusters);
}

#[test]
fn test_empty_image_is_rejected() {
    let intensity: IntensityGrid = Grid::new_default(0, 0);
    assert!(matches!(
        cluster(&intensity, &seeded(1, 0)),
        Err(Error::TooManyClusters { pixels: 0, .. })
    ));
}

// =============================================================================
// Results
// =============================================================================

#[test]
fn test_same_seed_same_result() {
    let base = rect_image(24, 24, 0.2, &[(Rect::new(4, 4, 14, 14), 0.8)]);
    let intensity = add_noise(&base, 0.05, 9);
    let config = seeded(6, 1234);

    let a = cluster(&intensity, &config).unwrap();
    let b = cluster(&intensity, &config).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.inertia, b.inertia);
    assert_eq!(a.centroids, b.centroids);
}

#[test]
fn test_parallel_bound_does_not_change_result() {
    let base = rect_image(20, 20, 0.1, &[(Rect::new(10, 0, 20, 20), 0.9)]);
    let intensity = add_noise(&base, 0.1, 3);

    let unbounded = cluster(&intensity, &seeded(5, 77)).unwrap();
    let bounded = cluster(
        &intensity,
        &ClusterConfig {
            max_parallel: Some(1),
            ..seeded(5, 77)
        },
    )
    .unwrap();
    assert_eq!(unbounded.labels, bounded.labels);
    assert_eq!(unbounded.inertia, bounded.inertia);
}

#[test]
fn test_labels_are_cluster_ids() {
    let intensity = add_noise(&Grid::new_filled(16, 12, 0.5), 0.3, 5);
    let result = cluster(&intensity, &seeded(7, 2)).unwrap();
    assert_eq!(result.labels.shape(), intensity.shape());
    assert_eq!(result.centroids.len(), 7);
    assert!(result.labels.iter().all(|&l| l < 7));
    assert!(result.inertia >= 0.0);
    assert!(result.iterations >= 1);
}

#[test]
fn test_two_halves_are_separated() {
    let intensity = rect_image(16, 16, 0.0, &[(Rect::new(8, 0, 16, 16), 1.0)]);
    let result = cluster(&intensity, &seeded(2, 42)).unwrap();

    let left = result.labels[(0, 0)];
    let right = result.labels[(15, 0)];
    assert_ne!(left, right);
    for y in 0..16 {
        for x in 0..16 {
            let expected = if x < 8 { left } else { right };
            assert_eq!(result.labels[(x, y)], expected, "pixel ({x}, {y})");
        }
    }
    assert!(result.converged);
}

#[test]
fn test_single_cluster_takes_everything() {
    let intensity = add_noise(&Grid::new_filled(8, 8, 0.5), 0.2, 11);
    let result = cluster(&intensity, &seeded(1, 0)).unwrap();
    assert!(result.labels.iter().all(|&l| l == 0));
    // The single centroid is the feature mean, which standardization puts at 0.
    for v in result.centroids[0] {
        assert!(v.abs() < 1e-9);
    }
}

// =============================================================================
// Building blocks
// =============================================================================

#[test]
fn test_empty_cluster_is_relocated_to_farthest_point() {
    let points: Vec<Feature> = vec![
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
    ];
    // Both centres start on the same spot; cluster 1 receives no points.
    let run = lloyd(&points, vec![[0.0; 3], [0.0; 3]], 50, 0.0);
    assert_eq!(run.assignments, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(run.inertia, 0.0);
    assert!(run.converged);
}

#[test]
fn test_iteration_cap_is_reported() {
    let points: Vec<Feature> = (0..40).map(|i| [i as f64, (i % 7) as f64, 0.0]).collect();
    let run = lloyd(&points, vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], 1, 0.0);
    assert_eq!(run.iterations, 1);
    assert!(!run.converged);
}

#[test]
fn test_kmeans_plus_plus_picks_distinct_points() {
    let points: Vec<Feature> = (0..50).map(|i| [i as f64, 0.0, 0.0]).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let centers = kmeans_plus_plus(&points, 5, &mut rng);
    assert_eq!(centers.len(), 5);
    for (i, a) in centers.iter().enumerate() {
        assert!(points.contains(a));
        for b in &centers[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
