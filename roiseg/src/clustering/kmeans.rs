//! One k-means run: greedy k-means++ seeding followed by Lloyd iterations.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::features::{Feature, squared_distance};

/// Points per parallel assignment chunk.
const ASSIGN_CHUNK: usize = 2048;

/// Outcome of a single initialization.
#[derive(Debug, Clone)]
pub(crate) struct KMeansRun {
    pub centroids: Vec<Feature>,
    pub assignments: Vec<u32>,
    pub inertia: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Greedy k-means++: every new centre is the best of `2 + ln k` candidates
/// sampled proportionally to the squared distance to the nearest chosen centre.
pub(crate) fn kmeans_plus_plus(points: &[Feature], k: usize, rng: &mut ChaCha8Rng) -> Vec<Feature> {
    let n = points.len();
    debug_assert!(k >= 1 && k <= n);

    let local_trials = 2 + (k as f64).ln() as usize;
    let mut centers = Vec::with_capacity(k);

    let first = points[rng.random_range(0..n)];
    centers.push(first);

    let mut closest: Vec<f64> = points.iter().map(|p| squared_distance(p, &first)).collect();
    let mut potential: f64 = closest.iter().sum();
    let mut cumulative = vec![0.0f64; n];
    let mut candidate_closest = vec![0.0f64; n];
    let mut best_closest = vec![0.0f64; n];

    for _ in 1..k {
        let mut running = 0.0;
        for (c, &d) in cumulative.iter_mut().zip(&closest) {
            running += d;
            *c = running;
        }

        let mut best: Option<(usize, f64)> = None;
        for _ in 0..local_trials {
            let candidate = if potential > 0.0 {
                let target = rng.random::<f64>() * potential;
                cumulative.partition_point(|&c| c < target).min(n - 1)
            } else {
                rng.random_range(0..n)
            };

            let mut candidate_potential = 0.0;
            for ((out, &d), p) in candidate_closest.iter_mut().zip(&closest).zip(points) {
                *out = d.min(squared_distance(p, &points[candidate]));
                candidate_potential += *out;
            }

            if best.is_none_or(|(_, pot)| candidate_potential < pot) {
                best = Some((candidate, candidate_potential));
                std::mem::swap(&mut best_closest, &mut candidate_closest);
            }
        }

        let Some((chosen, chosen_potential)) = best else {
            break;
        };
        centers.push(points[chosen]);
        std::mem::swap(&mut closest, &mut best_closest);
        potential = chosen_potential;
    }

    centers
}

/// Nearest centre for every point, with its squared distance.
fn assign(points: &[Feature], centers: &[Feature], out: &mut [(u32, f64)]) {
    out.par_chunks_mut(ASSIGN_CHUNK)
        .zip(points.par_chunks(ASSIGN_CHUNK))
        .for_each(|(out_chunk, point_chunk)| {
            for (slot, p) in out_chunk.iter_mut().zip(point_chunk) {
                let mut best = (0u32, f64::INFINITY);
                for (c, center) in centers.iter().enumerate() {
                    let d = squared_distance(p, center);
                    if d < best.1 {
                        best = (c as u32, d);
                    }
                }
                *slot = best;
            }
        });
}

/// Lloyd iterations from the given centres.
///
/// Stops when assignments repeat or when the summed squared centre shift
/// drops to `tolerance`. Empty clusters are re-seeded with the points farthest
/// from their current centre.
pub(crate) fn lloyd(
    points: &[Feature],
    mut centers: Vec<Feature>,
    max_iterations: usize,
    tolerance: f64,
) -> KMeansRun {
    let n = points.len();
    let k = centers.len();

    let mut assigned = vec![(0u32, 0.0f64); n];
    let mut previous: Option<Vec<u32>> = None;
    let mut iterations = 0;
    let mut converged = false;
    let mut labels_stable = false;

    while iterations < max_iterations {
        iterations += 1;
        assign(points, &centers, &mut assigned);
        let labels: Vec<u32> = assigned.iter().map(|&(l, _)| l).collect();

        if previous.as_ref() == Some(&labels) {
            converged = true;
            labels_stable = true;
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            let s = &mut sums[label as usize];
            s[0] += p[0];
            s[1] += p[1];
            s[2] += p[2];
            counts[label as usize] += 1;
        }

        relocate_empty_clusters(points, &assigned, &mut sums, &mut counts);

        let mut shift = 0.0;
        for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
            if count == 0 {
                continue;
            }
            let inv = 1.0 / count as f64;
            let updated = [sum[0] * inv, sum[1] * inv, sum[2] * inv];
            shift += squared_distance(center, &updated);
            *center = updated;
        }

        previous = Some(labels);

        if shift <= tolerance {
            converged = true;
            break;
        }
    }

    // Centres moved after the last assignment; make labels agree with them.
    if !labels_stable {
        assign(points, &centers, &mut assigned);
    }

    let inertia = assigned.iter().map(|&(_, d)| d).sum();
    KMeansRun {
        centroids: centers,
        assignments: assigned.into_iter().map(|(l, _)| l).collect(),
        inertia,
        iterations,
        converged,
    }
}

/// Move each empty cluster onto one of the points farthest from its centre,
/// taking that point out of its current cluster's running sums.
fn relocate_empty_clusters(
    points: &[Feature],
    assigned: &[(u32, f64)],
    sums: &mut [Feature],
    counts: &mut [usize],
) {
    let empty: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == 0)
        .map(|(i, _)| i)
        .collect();
    if empty.is_empty() {
        return;
    }

    let mut far: Vec<usize> = (0..points.len()).collect();
    far.sort_by(|&a, &b| assigned[b].1.total_cmp(&assigned[a].1).then(a.cmp(&b)));

    let mut donors = far.into_iter();
    for cluster in empty {
        let Some(idx) = donors.by_ref().find(|&i| counts[assigned[i].0 as usize] > 1) else {
            break;
        };
        let p = points[idx];
        let old = assigned[idx].0 as usize;
        sums[old][0] -= p[0];
        sums[old][1] -= p[1];
        sums[old][2] -= p[2];
        counts[old] -= 1;
        sums[cluster] = p;
        counts[cluster] = 1;
    }
}

/// Seed and run one initialization.
pub(crate) fn run_once(
    points: &[Feature],
    k: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
) -> KMeansRun {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers = kmeans_plus_plus(points, k, &mut rng);
    lloyd(points, centers, max_iterations, tolerance)
}
