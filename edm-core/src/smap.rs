//! S-Map projection (§4.6): per-prediction locally-weighted linear
//! regression solved by SVD, with optional Jacobian-product columns.

use nalgebra::{DMatrix, DVector};
use ndarray::{s, Array2, ArrayView2};

use crate::error::{EdmError, EdmResult};

#[derive(Debug, Clone)]
pub struct SMapParams {
    /// Local weighting exponent θ >= 0. θ = 0 gives uniform weights, i.e.
    /// ordinary least squares over the full library.
    pub theta: f64,
    /// Singular values below `svd_significance * max(sigma)` are zeroed in
    /// the pseudo-inverse.
    pub svd_significance: f64,
    /// `(i, j)` coefficient index pairs (1-indexed, `1..=E`) to emit
    /// `C[:, i] * C[:, j]` columns for. The core does not claim these are
    /// `∂ŷ/∂xⱼ` derivatives — it emits the literal product (SPEC_FULL.md
    /// Open Question 3).
    pub jacobian_pairs: Vec<(usize, usize)>,
}

impl Default for SMapParams {
    fn default() -> Self {
        Self {
            theta: 0.0,
            svd_significance: 1e-5,
            jacobian_pairs: Vec::new(),
        }
    }
}

pub struct SMapOutput {
    pub predictions: Vec<f64>,
    /// `(n_pred, E+1)`: bias term followed by one coefficient per dimension.
    pub coefficients: Array2<f64>,
    /// `(n_pred, jacobian_pairs.len())`.
    pub jacobians: Array2<f64>,
}

/// S-Map project `lib_targets` using the neighbor set `indices`/`distances`
/// (from [`crate::neighbors::neighbors`], typically called with `k` equal to
/// the full library so every row participates, per §4.6).
pub fn project(
    lib: ArrayView2<f64>,
    lib_targets: &[f64],
    pred: ArrayView2<f64>,
    indices: ArrayView2<usize>,
    distances: ArrayView2<f64>,
    params: &SMapParams,
) -> EdmResult<SMapOutput> {
    let e = lib.ncols() - 1;
    validate_jacobian_pairs(&params.jacobian_pairs, e)?;

    let n_pred = pred.nrows();
    let k = indices.ncols();

    let mut predictions = vec![f64::NAN; n_pred];
    let mut coefficients = Array2::<f64>::from_elem((n_pred, e + 1), f64::NAN);
    let mut jacobians = Array2::<f64>::from_elem((n_pred, params.jacobian_pairs.len()), f64::NAN);

    for p in 0..n_pred {
        let row_idx = indices.row(p);
        let row_dist = distances.row(p);

        let d_bar = row_dist.iter().sum::<f64>() / k as f64;
        let weights: Vec<f64> = if d_bar <= 0.0 {
            vec![1.0; k]
        } else {
            row_dist.iter().map(|&d| (-params.theta * d / d_bar).exp()).collect()
        };

        let mut a = DMatrix::<f64>::zeros(k, e + 1);
        let mut b = DVector::<f64>::zeros(k);
        for (row, (&lib_row, &w)) in row_idx.iter().zip(weights.iter()).enumerate() {
            a[(row, 0)] = w;
            for d in 0..e {
                a[(row, d + 1)] = w * lib[[lib_row, d + 1]];
            }
            b[row] = w * lib_targets[lib_row];
        }

        match solve_weighted_least_squares(&a, &b, params.svd_significance) {
            Ok(c) => {
                let mut pred_row = vec![1.0];
                pred_row.extend(pred.slice(s![p, 1..]).iter().copied());
                let prediction: f64 = pred_row.iter().zip(c.iter()).map(|(x, ci)| x * ci).sum();

                predictions[p] = prediction;
                for d in 0..=e {
                    coefficients[[p, d]] = c[d];
                }
                for (jcol, &(i, j)) in params.jacobian_pairs.iter().enumerate() {
                    jacobians[[p, jcol]] = c[i] * c[j];
                }
            }
            Err(EdmError::SingularSystem) => {
                tracing::warn!(row = p, "S-Map system singular, emitting NaN for this row");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(SMapOutput { predictions, coefficients, jacobians })
}

fn solve_weighted_least_squares(a: &DMatrix<f64>, b: &DVector<f64>, svd_significance: f64) -> EdmResult<DVector<f64>> {
    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
    if max_sv <= 0.0 {
        return Err(EdmError::SingularSystem);
    }
    let eps = svd_significance * max_sv;
    svd.solve(b, eps).map_err(|_| EdmError::SingularSystem)
}

fn validate_jacobian_pairs(pairs: &[(usize, usize)], e: usize) -> EdmResult<()> {
    for &(i, j) in pairs {
        if i == 0 || j == 0 || i > e || j > e {
            return Err(EdmError::BadJacobianPair { i, j });
        }
    }
    Ok(())
}
