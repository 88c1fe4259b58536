//! Nearest-neighbor search over phase-space rows (§4.4).
//!
//! Partial selection (k-smallest) is sufficient per the spec; this uses a
//! full per-row sort for simplicity since library sizes in EDM workloads are
//! modest (hundreds to low thousands of rows) and the sort is dominated by
//! the O(k·|lib|) distance computations anyway.

use ndarray::{s, Array2, ArrayView2};

use crate::distance::euclidean;
use crate::error::{EdmError, EdmResult};

#[derive(Debug, Clone, Copy)]
pub struct NeighborParams {
    pub k: usize,
    /// Rows with `|time(lib) - time(pred)| <= exclusion_radius` are excluded
    /// from the candidate set. `0` (the default) excludes only exact time
    /// coincidence, which also covers self-exclusion.
    pub exclusion_radius: u64,
}

/// For each row of `pred`, find the `k` nearest rows of `lib` (by Euclidean
/// distance over columns `1..`), excluding any library row within
/// `exclusion_radius` of the prediction row's time value.
///
/// Returns library-local indices (relative to `lib`'s own row numbering) and
/// the matching distances, both shaped `(pred.nrows(), k)`, sorted ascending
/// by distance with ties broken by the smaller library index.
pub fn neighbors(
    lib: ArrayView2<f64>,
    pred: ArrayView2<f64>,
    params: &NeighborParams,
) -> EdmResult<(Array2<usize>, Array2<f64>)> {
    if params.k == 0 {
        return Err(EdmError::InvalidParam("k must be >= 1".into()));
    }

    let n_pred = pred.nrows();
    let mut indices = Array2::<usize>::zeros((n_pred, params.k));
    let mut distances = Array2::<f64>::zeros((n_pred, params.k));

    for p in 0..n_pred {
        let time_p = pred[[p, 0]];
        let pred_coords = pred.slice(s![p, 1..]);

        let mut candidates: Vec<(usize, f64)> = Vec::with_capacity(lib.nrows());
        for l in 0..lib.nrows() {
            let time_l = lib[[l, 0]];
            if time_gap(time_l, time_p) <= params.exclusion_radius {
                continue;
            }
            let d = euclidean(lib.slice(s![l, 1..]), pred_coords);
            candidates.push((l, d));
        }

        if candidates.len() < params.k {
            return Err(EdmError::LibraryTooSmall {
                need: params.k,
                have: candidates.len(),
            });
        }

        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));

        for (j, (idx, dist)) in candidates.into_iter().take(params.k).enumerate() {
            indices[[p, j]] = idx;
            distances[[p, j]] = dist;
        }
    }

    Ok((indices, distances))
}

fn time_gap(a: f64, b: f64) -> u64 {
    (a - b).abs().round() as u64
}
