//! Error statistics: Pearson ρ, OLS slope `r`, RMSE, MAE (§4.1).

use crate::error::{EdmError, EdmResult};

/// Observed-vs-predicted error statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStats {
    /// Pearson correlation coefficient between observed and predicted.
    pub rho: f64,
    /// Slope `r` of the OLS fit `pred ≈ a + r·obs`. Despite the name this is
    /// the regression slope, not the correlation coefficient — it differs
    /// from `rho` whenever `obs` and `pred` have different variances. See
    /// Open Question 1 in SPEC_FULL.md.
    pub r: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// Compute §4.1 error statistics over two aligned vectors, dropping any row
/// where either value is non-finite.
pub fn error_stats(obs: &[f64], pred: &[f64]) -> EdmResult<ErrorStats> {
    debug_assert_eq!(obs.len(), pred.len(), "obs/pred must be aligned");

    let pairs: Vec<(f64, f64)> = obs
        .iter()
        .zip(pred.iter())
        .filter(|(o, p)| o.is_finite() && p.is_finite())
        .map(|(&o, &p)| (o, p))
        .collect();

    if pairs.len() < 2 {
        return Err(EdmError::InsufficientData { have: pairs.len() });
    }

    let n = pairs.len() as f64;
    let obs_mean = pairs.iter().map(|(o, _)| o).sum::<f64>() / n;
    let pred_mean = pairs.iter().map(|(_, p)| p).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut obs_var = 0.0;
    let mut pred_var = 0.0;
    for (o, p) in &pairs {
        let od = o - obs_mean;
        let pd = p - pred_mean;
        cov += od * pd;
        obs_var += od * od;
        pred_var += pd * pd;
    }

    let (rho, r) = if obs_var <= 0.0 {
        tracing::warn!("error_stats: zero variance in observed values, rho and r set to 0");
        (0.0, 0.0)
    } else {
        let rho = if pred_var <= 0.0 {
            0.0
        } else {
            cov / (obs_var.sqrt() * pred_var.sqrt())
        };
        let r = cov / obs_var;
        (rho, r)
    };

    let sq_err: f64 = pairs.iter().map(|(o, p)| (p - o) * (p - o)).sum();
    let abs_err: f64 = pairs.iter().map(|(o, p)| (p - o).abs()).sum();

    Ok(ErrorStats {
        rho,
        r,
        rmse: (sq_err / n).sqrt(),
        mae: abs_err / n,
    })
}
