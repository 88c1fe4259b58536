//! Simplex projection (§4.5): exponential-weighted convex combination of
//! neighbor targets (Sugihara & May, 1990).

use ndarray::{Array2, ArrayView2};

/// Distance beyond which a row is treated as unusable and its prediction is
/// `NaN` (§3 invariants: "infinite sentinel (>=1e30) signals unusable").
const UNUSABLE_DISTANCE: f64 = 1e30;

/// Simplex-project `lib_targets` using the neighbor `indices`/`distances`
/// produced by [`crate::neighbors::neighbors`]. `indices` holds row numbers
/// local to the library the neighbors were searched over.
pub fn project(lib_targets: &[f64], indices: ArrayView2<usize>, distances: ArrayView2<f64>) -> Vec<f64> {
    let n_pred = indices.nrows();
    let k = indices.ncols();
    let mut predictions = Vec::with_capacity(n_pred);

    for p in 0..n_pred {
        let row_idx = indices.row(p);
        let row_dist = distances.row(p);

        let d1 = row_dist.iter().cloned().fold(f64::INFINITY, f64::min);

        if d1 > UNUSABLE_DISTANCE {
            predictions.push(f64::NAN);
            continue;
        }

        let weights: Vec<f64> = if d1 == 0.0 {
            row_dist.iter().map(|&d| if d == 0.0 { 1.0 } else { 0.0 }).collect()
        } else {
            row_dist.iter().map(|&d| (-d / d1).exp()).collect()
        };

        let weight_sum: f64 = weights.iter().sum();
        let weighted_sum: f64 = (0..k)
            .map(|j| weights[j] * lib_targets[row_idx[j]])
            .sum();

        predictions.push(if weight_sum > 0.0 {
            weighted_sum / weight_sum
        } else {
            f64::NAN
        });
    }

    predictions
}

/// Convenience wrapper returning predictions as an owned column matrix
/// `[prediction]`, used when the driver needs a uniform `Array2` shape
/// across Simplex and S-Map output.
pub fn project_column(lib_targets: &[f64], indices: ArrayView2<usize>, distances: ArrayView2<f64>) -> Array2<f64> {
    let predictions = project(lib_targets, indices, distances);
    Array2::from_shape_vec((predictions.len(), 1), predictions).expect("shape matches prediction count")
}
