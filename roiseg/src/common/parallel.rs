//! Bounded parallel mapping over independent jobs.

use rayon::prelude::*;

/// Maps `f` over `items` in parallel with at most `max_concurrent` items in flight.
///
/// `None` lets rayon schedule everything at once. Results keep the input order,
/// so callers that reduce over them stay deterministic regardless of which job
/// finishes first.
///
/// # Panics
///
/// Panics if `max_concurrent` is `Some(0)`.
pub fn par_map_bounded<T, R, F>(items: &[T], max_concurrent: Option<usize>, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let Some(limit) = max_concurrent else {
        return items.par_iter().map(&f).collect();
    };
    assert!(limit > 0, "max_concurrent must be > 0");

    let mut results = Vec::with_capacity(items.len());
    for chunk in items.chunks(limit) {
        let chunk_results: Vec<R> = chunk.par_iter().map(&f).collect();
        results.extend(chunk_results);
    }
    results
}
