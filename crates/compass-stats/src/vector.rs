//! Dense `f64` vector operations.
//!
//! All functions take slices of equal length. Lengths are checked with
//! `debug_assert!` only; callers are expected to align vectors to a single
//! feature schema.

use std::iter;

/// Dot product of two vectors.
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vector length mismatch");
    iter::zip(a, b).map(|(x, y)| x * y).sum()
}

/// Euclidean (L2) magnitude of a vector.
#[must_use]
pub fn magnitude(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when either vector has zero magnitude.
///
/// # Examples
///
/// ```
/// use compass_stats::vector::cosine_similarity;
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = magnitude(a) * magnitude(b);
    if denom == 0.0 {
        return 0.0;
    }
    dot(a, b) / denom
}
