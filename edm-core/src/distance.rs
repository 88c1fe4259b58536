//! Euclidean distance between phase-space vectors.
//!
//! The time column (index 0 of a phase-space matrix row) is never part of
//! the distance calculation; callers pass only the `1..=E` embedding
//! dimensions.

use ndarray::ArrayView1;

/// Euclidean distance between two equal-length coordinate vectors.
#[inline]
pub fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "coordinate dimensions must match");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Euclidean distance between two plain slices, for callers that do not
/// already hold an `ndarray` view (CCM's precomputed distance matrix, for
/// example, indexes into row-major `Vec<f64>` storage).
#[inline]
pub fn euclidean_slice(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
