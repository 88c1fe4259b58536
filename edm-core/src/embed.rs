//! Time-delay embedding (§4.3): lag construction, row deletion and the
//! `Tp`-shifted target vector, generalized from the teacher's univariate
//! `delay_embed`/`DelayEmbedding` to the spec's multivariable, directional
//! embedding.

use ndarray::Array2;

use crate::dataset::Dataset;
use crate::error::{EdmError, EdmResult};

/// Parameters for a single `Embed` call (§9 splits the historical global
/// argument bag into small per-operation structs).
#[derive(Debug, Clone, Copy)]
pub struct EmbedParams {
    /// Embedding dimension E (number of lagged coordinates per variable).
    pub e: usize,
    /// Time delay τ between successive coordinates.
    pub tau: usize,
    /// `false` (default): backward embedding, `x[i - (j-1)*tau]`.
    /// `true`: forward embedding, `x[i + (j-1)*tau]`.
    pub forward: bool,
    /// Forecast horizon Tp; may be zero or negative.
    pub tp: i64,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            e: 1,
            tau: 1,
            forward: false,
            tp: 0,
        }
    }
}

/// Time-delay embed `embed_columns` of `dataset` at dimension/lag/direction
/// given by `params`, and align the `Tp`-shifted `target_column` to the
/// surviving rows.
///
/// Returns the phase-space matrix `M` (column 0 is time, columns `1..=m*E`
/// are lagged coordinates in input-column order), the generated column
/// names (time first), and the target vector `y`.
pub fn embed(
    dataset: &Dataset,
    embed_columns: &[&str],
    target_column: &str,
    params: &EmbedParams,
) -> EdmResult<(Array2<f64>, Vec<String>, Vec<f64>)> {
    if params.e == 0 {
        return Err(EdmError::InvalidParam("E must be >= 1".into()));
    }
    if params.tau == 0 {
        return Err(EdmError::InvalidParam("tau must be >= 1".into()));
    }
    if embed_columns.is_empty() {
        return Err(EdmError::InvalidParam("at least one embed column is required".into()));
    }

    let l = dataset.len();
    let lag_span = (params.e - 1) * params.tau;
    if l <= lag_span {
        return Err(EdmError::ShapeMismatch(format!(
            "series length {l} too short for E={} tau={} ({lag_span} lag rows required)",
            params.e, params.tau
        )));
    }

    // `orig_idx(r)` maps an output row r to the original row it describes.
    let n = l - lag_span;
    let orig_idx = |r: usize| -> usize {
        if params.forward {
            r
        } else {
            r + lag_span
        }
    };

    let columns: Vec<&[f64]> = embed_columns
        .iter()
        .map(|name| dataset.column(name))
        .collect::<EdmResult<_>>()?;
    let target = dataset.column(target_column)?;

    let width = 1 + embed_columns.len() * params.e;
    let mut m = Array2::<f64>::zeros((n, width));
    let mut names = Vec::with_capacity(width);
    names.push("time".to_string());

    for r in 0..n {
        m[[r, 0]] = dataset.time[orig_idx(r)];
    }

    let mut col_out = 1;
    for (&name, series) in embed_columns.iter().zip(columns.iter()) {
        for j in 0..params.e {
            let lag = j * params.tau;
            names.push(if j == 0 {
                format!("{name}(t)")
            } else if params.forward {
                format!("{name}(t+{lag})")
            } else {
                format!("{name}(t-{lag})")
            });

            for r in 0..n {
                let i = orig_idx(r);
                let src = if params.forward { i + lag } else { i - lag };
                m[[r, col_out]] = series[src];
            }
            col_out += 1;
        }
    }

    let mut y = vec![f64::NAN; n];
    for r in 0..n {
        let shifted = orig_idx(r) as i64 + params.tp;
        if shifted >= 0 && (shifted as usize) < l {
            y[r] = target[shifted as usize];
        }
    }

    Ok((m, names, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_dataset(len: usize) -> Dataset {
        let time: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let x: Vec<f64> = (0..len).map(|i| (i + 1) as f64).collect();
        Dataset::new(time, vec![("x".to_string(), x)]).unwrap()
    }

    #[test]
    fn backward_embedding_matches_spec_example() {
        // x = [1,2,3,4,5,6], E=3, tau=2 (§3 worked example style).
        let ds = series_dataset(6);
        let params = EmbedParams { e: 3, tau: 2, forward: false, tp: 0 };
        let (m, names, _y) = embed(&ds, &["x"], "x", &params).unwrap();

        assert_eq!(names, vec!["time", "x(t)", "x(t-2)", "x(t-4)"]);
        // rows with i < (E-1)*tau = 4 are deleted, leaving i=4,5 => 2 rows.
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.row(0).to_vec(), vec![4.0, 5.0, 3.0, 1.0]);
        assert_eq!(m.row(1).to_vec(), vec![5.0, 6.0, 4.0, 2.0]);
    }

    #[test]
    fn forward_embedding_deletes_trailing_rows() {
        let ds = series_dataset(5);
        let params = EmbedParams { e: 2, tau: 1, forward: true, tp: 0 };
        let (m, names, _y) = embed(&ds, &["x"], "x", &params).unwrap();

        assert_eq!(names, vec!["time", "x(t)", "x(t+1)"]);
        assert_eq!(m.nrows(), 4); // 5 - (E-1)*tau
        assert_eq!(m.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(m.row(3).to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn row_count_invariant_holds_for_any_e_tau() {
        for e in 1..=5usize {
            for tau in 1..=3usize {
                let len = 50;
                let ds = series_dataset(len);
                let params = EmbedParams { e, tau, forward: false, tp: 0 };
                let (m, _, y) = embed(&ds, &["x"], "x", &params).unwrap();
                assert_eq!(m.nrows(), len - (e - 1) * tau);
                assert_eq!(y.len(), m.nrows());
            }
        }
    }

    #[test]
    fn column_one_is_original_series_restricted_to_surviving_rows() {
        let ds = series_dataset(20);
        let params = EmbedParams { e: 4, tau: 2, forward: false, tp: 0 };
        let (m, _, _) = embed(&ds, &["x"], "x", &params).unwrap();
        let lag_span = (params.e - 1) * params.tau;
        for r in 0..m.nrows() {
            assert_eq!(m[[r, 1]], ds.column("x").unwrap()[r + lag_span]);
        }
    }

    #[test]
    fn tp_shift_pads_out_of_range_target_with_nan() {
        let ds = series_dataset(10);
        let params = EmbedParams { e: 1, tau: 1, forward: false, tp: 3 };
        let (_, _, y) = embed(&ds, &["x"], "x", &params).unwrap();
        assert_eq!(y.len(), 10);
        assert!(y[8].is_nan());
        assert!(y[9].is_nan());
        assert_eq!(y[0], ds.column("x").unwrap()[3]);
    }

    #[test]
    fn multivariable_embedding_orders_columns_by_input_variable() {
        let time: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let x: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let yv: Vec<f64> = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let ds = Dataset::new(time, vec![("x".into(), x), ("y".into(), yv)]).unwrap();
        let params = EmbedParams { e: 2, tau: 1, forward: false, tp: 0 };
        let (m, names, _) = embed(&ds, &["x", "y"], "x", &params).unwrap();
        assert_eq!(names, vec!["time", "x(t)", "x(t-1)", "y(t)", "y(t-1)"]);
        assert_eq!(m.ncols(), 1 + 2 * 2);
    }

    #[test]
    fn rejects_zero_dimension_or_tau() {
        let ds = series_dataset(10);
        assert!(embed(&ds, &["x"], "x", &EmbedParams { e: 0, tau: 1, forward: false, tp: 0 }).is_err());
        assert!(embed(&ds, &["x"], "x", &EmbedParams { e: 2, tau: 0, forward: false, tp: 0 }).is_err());
    }

    #[test]
    fn rejects_series_too_short_for_embedding() {
        let ds = series_dataset(3);
        let params = EmbedParams { e: 5, tau: 2, forward: false, tp: 0 };
        assert!(embed(&ds, &["x"], "x", &params).is_err());
    }
}
