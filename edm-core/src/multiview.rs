//! Multiview ensembles (§4.9): rank E-sized embedding-column subsets
//! in-sample, average the top-K out-of-sample.

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::embed::{embed, EmbedParams};
use crate::error::{EdmError, EdmResult};
use crate::method::Method;
use crate::predict::{predict, PredictParams, Range};
use crate::stats::{self, ErrorStats};

#[derive(Debug, Clone)]
pub struct MultiviewParams {
    pub e: usize,
    pub tau: usize,
    pub tp: i64,
    pub lib: Range,
    pub pred: Range,
    /// Number of top in-sample subsets to average out-of-sample. `0`
    /// selects `max(2, floor(sqrt(#subsets)))` (Ye & Sugihara 2016).
    pub top_k: usize,
}

impl Default for MultiviewParams {
    fn default() -> Self {
        Self { e: 1, tau: 1, tp: 0, lib: (0, 0), pred: (0, 0), top_k: 0 }
    }
}

pub struct SubsetResult {
    pub columns: Vec<usize>,
    pub stats: ErrorStats,
}

pub struct MultiviewOutput {
    pub stats: ErrorStats,
    pub header: Vec<String>,
    pub output: Array2<f64>,
    pub top_subsets: Vec<SubsetResult>,
}

/// Run Multiview over `embed_columns`, forecasting `target_column`.
pub fn multiview(
    dataset: &Dataset,
    embed_columns: &[&str],
    target_column: &str,
    params: &MultiviewParams,
) -> EdmResult<MultiviewOutput> {
    if params.e == 0 {
        return Err(EdmError::InvalidParam("E must be >= 1".into()));
    }
    if embed_columns.is_empty() {
        return Err(EdmError::InvalidParam("Multiview requires at least one embedding column".into()));
    }

    let embed_params = EmbedParams { e: params.e, tau: params.tau, forward: false, tp: params.tp };
    let (m, names, y) = embed(dataset, embed_columns, target_column, &embed_params)?;

    let n_var = embed_columns.len();
    let total_cols = n_var * params.e;

    // 1-indexed column numbers 1..=n_var*E, E at a time; retain only subsets
    // with at least one unlagged coordinate (column index ≡ 1 mod E).
    let combos: Vec<Vec<usize>> = (1..=total_cols)
        .combinations(params.e)
        .filter(|c| c.iter().any(|&x| (x - 1) % params.e == 0))
        .collect();

    if combos.is_empty() {
        return Err(EdmError::InvalidParam("no valid variable combinations for the given E".into()));
    }

    let top_k = if params.top_k == 0 {
        ((combos.len() as f64).sqrt() as usize).max(2)
    } else {
        params.top_k
    };
    let top_k = top_k.min(combos.len());

    // In-sample ranking: prediction slice == library slice.
    let in_sample: Vec<(Vec<usize>, EdmResult<ErrorStats>)> = combos
        .par_iter()
        .map(|combo| {
            let sub_m = select_columns(m.view(), combo);
            let result = predict(
                sub_m.view(),
                &y,
                &PredictParams {
                    method: Method::Simplex,
                    lib: params.lib,
                    pred: params.lib,
                    k: 0,
                    exclusion_radius: 0,
                    tp: params.tp,
                },
            );
            (combo.clone(), result.map(|o| o.stats))
        })
        .collect();

    let mut ranked: Vec<(Vec<usize>, ErrorStats)> = Vec::with_capacity(in_sample.len());
    for (combo, result) in in_sample {
        match result {
            Ok(stats) => ranked.push((combo, stats)),
            Err(EdmError::InsufficientData { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    ranked.sort_by(|a, b| b.1.rho.partial_cmp(&a.1.rho).unwrap());

    let chosen: Vec<Vec<usize>> = ranked.iter().take(top_k).map(|(c, _)| c.clone()).collect();

    // Out-of-sample run per chosen subset.
    let out_of_sample: Vec<EdmResult<(Vec<usize>, Array2<f64>, ErrorStats)>> = chosen
        .par_iter()
        .map(|combo| {
            let sub_m = select_columns(m.view(), combo);
            let out = predict(
                sub_m.view(),
                &y,
                &PredictParams {
                    method: Method::Simplex,
                    lib: params.lib,
                    pred: params.pred,
                    k: 0,
                    exclusion_radius: 0,
                    tp: params.tp,
                },
            )?;
            Ok((combo.clone(), out.output, out.stats))
        })
        .collect();

    let mut top_subsets = Vec::with_capacity(out_of_sample.len());
    let mut prediction_columns: Vec<Array1<f64>> = Vec::with_capacity(out_of_sample.len());
    let mut time_col = None;
    let mut observed_col = None;
    for result in out_of_sample {
        let (combo, output, stats) = result?;
        if time_col.is_none() {
            time_col = Some(output.column(0).to_owned());
            observed_col = Some(output.column(1).to_owned());
        }
        prediction_columns.push(output.column(2).to_owned());
        top_subsets.push(SubsetResult { columns: combo, stats });
    }

    let n_pred = prediction_columns[0].len();
    let k = prediction_columns.len() as f64;
    let mut averaged = Array1::<f64>::zeros(n_pred);
    for col in &prediction_columns {
        averaged += col;
    }
    averaged /= k;

    let time_col = time_col.unwrap();
    let observed_col = observed_col.unwrap();
    let mut output = Array2::<f64>::zeros((n_pred, 3));
    output.column_mut(0).assign(&time_col);
    output.column_mut(1).assign(&observed_col);
    output.column_mut(2).assign(&averaged);

    let stats = stats::error_stats(observed_col.as_slice().unwrap(), averaged.as_slice().unwrap())?;
    let header = vec!["time".to_string(), "observed".to_string(), "predicted".to_string()];

    let _ = names; // column names not needed beyond embedding; kept for symmetry with embed()'s signature
    Ok(MultiviewOutput { stats, header, output, top_subsets })
}

fn select_columns(m: ArrayView2<f64>, combo: &[usize]) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((m.nrows(), combo.len() + 1));
    out.column_mut(0).assign(&m.column(0));
    for (j, &c) in combo.iter().enumerate() {
        out.column_mut(j + 1).assign(&m.index_axis(Axis(1), c));
    }
    out
}
