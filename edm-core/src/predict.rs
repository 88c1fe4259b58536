//! Prediction driver (§4.7): embedding -> library/prediction slicing ->
//! neighbor search -> projector -> error stats.

use ndarray::{s, Array2, ArrayView2};

use crate::error::{EdmError, EdmResult};
use crate::method::Method;
use crate::neighbors::{self, NeighborParams};
use crate::stats::{self, ErrorStats};

/// Half-open row range `[lo, hi)` into a phase-space matrix.
pub type Range = (usize, usize);

#[derive(Debug, Clone)]
pub struct PredictParams {
    pub method: Method,
    pub lib: Range,
    pub pred: Range,
    /// `0` selects the per-method default (E+1 for Simplex, the full
    /// library for S-Map); any other value is used verbatim.
    pub k: usize,
    pub exclusion_radius: u64,
    /// Forecast horizon, used only to label the output `time` column —
    /// `y` itself was already Tp-shifted by `embed`.
    pub tp: i64,
}

impl Default for PredictParams {
    fn default() -> Self {
        Self {
            method: Method::Simplex,
            lib: (0, 0),
            pred: (0, 0),
            k: 0,
            exclusion_radius: 0,
            tp: 0,
        }
    }
}

pub struct SMapTable {
    pub header: Vec<String>,
    pub table: Array2<f64>,
}

pub struct PredictOutput {
    pub stats: ErrorStats,
    pub header: Vec<String>,
    pub output: Array2<f64>,
    pub smap_output: Option<SMapTable>,
}

pub fn predict(m: ArrayView2<f64>, y: &[f64], params: &PredictParams) -> EdmResult<PredictOutput> {
    let n = m.nrows();
    if y.len() != n {
        return Err(EdmError::ShapeMismatch(format!(
            "M has {n} rows but y has {} entries",
            y.len()
        )));
    }
    let e = m.ncols().saturating_sub(1);
    if e == 0 {
        return Err(EdmError::InvalidParam("M must have at least one embedding dimension".into()));
    }

    validate_range("lib", params.lib, n)?;
    validate_range("pred", params.pred, n)?;

    let lib_len = params.lib.1 - params.lib.0;

    let k_eff = match &params.method {
        Method::Simplex => {
            if params.k == 0 {
                e + 1
            } else {
                params.k
            }
        }
        Method::SMap(_) => {
            if params.k == 0 {
                lib_len
            } else {
                if params.k < e + 2 {
                    return Err(EdmError::InvalidParam(format!(
                        "S-Map requires k >= E + 2 ({}) when k is explicit, got {}",
                        e + 2,
                        params.k
                    )));
                }
                params.k
            }
        }
    };
    if k_eff == 0 {
        return Err(EdmError::InvalidParam("k must be >= 1".into()));
    }

    let m_lib = m.slice(s![params.lib.0..params.lib.1, ..]);
    let m_pred = m.slice(s![params.pred.0..params.pred.1, ..]);
    let y_lib = &y[params.lib.0..params.lib.1];
    let y_pred = &y[params.pred.0..params.pred.1];

    let (indices, distances) = neighbors::neighbors(
        m_lib,
        m_pred,
        &NeighborParams { k: k_eff, exclusion_radius: params.exclusion_radius },
    )?;

    let projection = params.method.project(m_lib, y_lib, m_pred, indices.view(), distances.view())?;

    let n_pred = m_pred.nrows();
    let mut output = Array2::<f64>::zeros((n_pred, 3));
    for r in 0..n_pred {
        output[[r, 0]] = m_pred[[r, 0]] + params.tp as f64;
        output[[r, 1]] = y_pred[r];
        output[[r, 2]] = projection.predictions[r];
    }
    let header = vec!["time".to_string(), "observed".to_string(), "predicted".to_string()];

    let stats = stats::error_stats(y_pred, &projection.predictions)?;

    let smap_output = if let (Some(coeffs), Some(jacs)) = (&projection.coefficients, &projection.jacobians) {
        let mut smap_header = vec!["time".to_string(), "c0".to_string()];
        for d in 1..=e {
            smap_header.push(format!("c{d}"));
        }
        let jac_pairs = match &params.method {
            Method::SMap(p) => p.jacobian_pairs.clone(),
            Method::Simplex => Vec::new(),
        };
        for &(i, j) in &jac_pairs {
            smap_header.push(format!("jac_{i}_{j}"));
        }

        let mut table = Array2::<f64>::zeros((n_pred, 1 + (e + 1) + jac_pairs.len()));
        for r in 0..n_pred {
            table[[r, 0]] = m_pred[[r, 0]] + params.tp as f64;
            for d in 0..=e {
                table[[r, 1 + d]] = coeffs[[r, d]];
            }
            for j in 0..jac_pairs.len() {
                table[[r, 2 + e + j]] = jacs[[r, j]];
            }
        }
        Some(SMapTable { header: smap_header, table })
    } else {
        None
    };

    Ok(PredictOutput { stats, header, output, smap_output })
}

fn validate_range(name: &str, range: Range, n: usize) -> EdmResult<()> {
    if range.0 >= range.1 {
        return Err(EdmError::InvalidParam(format!("{name} range must be non-empty: {range:?}")));
    }
    if range.1 > n {
        return Err(EdmError::InvalidParam(format!("{name} range {range:?} exceeds {n} rows")));
    }
    Ok(())
}
