//! Parameter sweeps (§4.10): stateless broadcasts of the prediction driver
//! over E, Tp, or θ, dispatched to the `rayon` global pool.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::dataset::Dataset;
use crate::embed::{embed, EmbedParams};
use crate::error::EdmError;
use crate::method::Method;
use crate::predict::{predict, PredictParams, Range};
use crate::smap::SMapParams;
use crate::stats::ErrorStats;

/// Fixed θ grid from §4.10.
pub const THETA_GRID: &[f64] = &[0.01, 0.1, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

pub struct SweepPoint<P> {
    pub param: P,
    pub stats: ErrorStats,
}

/// E-sweep: E ∈ {1..10}, k_NN = E + 1, Simplex.
pub fn e_sweep(
    dataset: &Dataset,
    embed_columns: &[&str],
    target_column: &str,
    lib: Range,
    pred: Range,
    tp: i64,
    wall_clock_timeout: Option<Duration>,
) -> Vec<SweepPoint<usize>> {
    let dataset = Arc::new(dataset.clone());
    let embed_columns: Vec<String> = embed_columns.iter().map(|s| s.to_string()).collect();
    let target_column = target_column.to_string();

    let tasks: Vec<usize> = (1..=10).collect();
    let results = collect_with_timeout(tasks, wall_clock_timeout, move |e| {
        let cols: Vec<&str> = embed_columns.iter().map(|s| s.as_str()).collect();
        let embed_params = EmbedParams { e, tau: 1, forward: false, tp };
        let point = embed(&dataset, &cols, &target_column, &embed_params).and_then(|(m, _names, y)| {
            predict(
                m.view(),
                &y,
                &PredictParams { method: Method::Simplex, lib, pred, k: 0, exclusion_radius: 0, tp },
            )
            .map(|out| out.stats)
        });
        (e, point)
    });

    let mut points: Vec<SweepPoint<usize>> = results
        .into_iter()
        .filter_map(|(e, r)| match r {
            Ok(stats) => Some(SweepPoint { param: e, stats }),
            Err(err) => {
                tracing::warn!(e, %err, "E-sweep point failed, skipping");
                None
            }
        })
        .collect();
    points.sort_by_key(|p| p.param);
    points
}

/// Tp-sweep: Tp ∈ {1..10}, Simplex at a fixed E/τ.
pub fn tp_sweep(
    dataset: &Dataset,
    embed_columns: &[&str],
    target_column: &str,
    e: usize,
    tau: usize,
    lib: Range,
    pred: Range,
    wall_clock_timeout: Option<Duration>,
) -> Vec<SweepPoint<i64>> {
    let dataset = Arc::new(dataset.clone());
    let embed_columns: Vec<String> = embed_columns.iter().map(|s| s.to_string()).collect();
    let target_column = target_column.to_string();

    let tasks: Vec<i64> = (1..=10).collect();
    let results = collect_with_timeout(tasks, wall_clock_timeout, move |tp| {
        let cols: Vec<&str> = embed_columns.iter().map(|s| s.as_str()).collect();
        let embed_params = EmbedParams { e, tau, forward: false, tp };
        let point = embed(&dataset, &cols, &target_column, &embed_params).and_then(|(m, _names, y)| {
            predict(
                m.view(),
                &y,
                &PredictParams { method: Method::Simplex, lib, pred, k: 0, exclusion_radius: 0, tp },
            )
            .map(|out| out.stats)
        });
        (tp, point)
    });

    let mut points: Vec<SweepPoint<i64>> = results
        .into_iter()
        .filter_map(|(tp, r)| match r {
            Ok(stats) => Some(SweepPoint { param: tp, stats }),
            Err(err) => {
                tracing::warn!(tp, %err, "Tp-sweep point failed, skipping");
                None
            }
        })
        .collect();
    points.sort_by_key(|p| p.param);
    points
}

/// θ-sweep: θ over the fixed §4.10 grid, S-Map at a fixed E/τ/Tp. The
/// embedding does not depend on θ, so it is computed once and shared.
pub fn theta_sweep(
    dataset: &Dataset,
    embed_columns: &[&str],
    target_column: &str,
    e: usize,
    tau: usize,
    tp: i64,
    lib: Range,
    pred: Range,
    svd_significance: f64,
    wall_clock_timeout: Option<Duration>,
) -> Result<Vec<SweepPoint<f64>>, EdmError> {
    let embed_params = EmbedParams { e, tau, forward: false, tp };
    let (m, _names, y) = embed(dataset, embed_columns, target_column, &embed_params)?;
    let shared = Arc::new((m, y));

    let tasks: Vec<f64> = THETA_GRID.to_vec();
    let results = collect_with_timeout(tasks, wall_clock_timeout, move |theta| {
        let (m, y) = &*shared;
        let params = PredictParams {
            method: Method::SMap(SMapParams { theta, svd_significance, jacobian_pairs: Vec::new() }),
            lib,
            pred,
            k: 0,
            exclusion_radius: 0,
            tp,
        };
        let point = predict(m.view(), y, &params).map(|out| out.stats);
        (theta, point)
    });

    let mut points: Vec<SweepPoint<f64>> = results
        .into_iter()
        .filter_map(|(theta, r)| match r {
            Ok(stats) => Some(SweepPoint { param: theta, stats }),
            Err(err) => {
                tracing::warn!(theta, %err, "theta-sweep point failed, skipping");
                None
            }
        })
        .collect();
    points.sort_by(|a, b| a.param.partial_cmp(&b.param).unwrap());
    Ok(points)
}

/// Dispatch one `rayon` task per item and collect results as they arrive,
/// stopping once `timeout` elapses (§5.1: in-flight tasks are not
/// cancelled, only the aggregator stops waiting on them).
fn collect_with_timeout<I, O, F>(items: Vec<I>, timeout: Option<Duration>, f: F) -> Vec<O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> O + Sync + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let f = Arc::new(f);
    let expected = items.len();
    for item in items {
        let tx = tx.clone();
        let f = Arc::clone(&f);
        rayon::spawn(move || {
            let result = f(item);
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let deadline = timeout.map(|d| Instant::now() + d);
    let mut results = Vec::with_capacity(expected);
    loop {
        let recv = match deadline {
            Some(dl) => {
                let now = Instant::now();
                if now >= dl {
                    break;
                }
                rx.recv_timeout(dl - now)
            }
            None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
        };
        match recv {
            Ok(o) => results.push(o),
            Err(_) => break,
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent_dataset(n: usize) -> Dataset {
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mut x = vec![0.1_f64];
        for _ in 1..n {
            let prev = *x.last().unwrap();
            x.push(if prev < 0.5 { 2.0 * prev } else { 2.0 * (1.0 - prev) });
        }
        Dataset::new(time, vec![("x".to_string(), x)]).unwrap()
    }

    #[test]
    fn e_sweep_peaks_near_e_two_on_tent_map() {
        let ds = tent_dataset(500);
        let points = e_sweep(&ds, &["x"], "x", (0, 100), (200, 500), 1, None);
        assert!(!points.is_empty());
        let best = points.iter().max_by(|a, b| a.stats.rho.partial_cmp(&b.stats.rho).unwrap()).unwrap();
        assert!(best.param <= 3, "expected peak near E=2, got E={}", best.param);
        assert!(best.stats.rho >= 0.9);
    }

    #[test]
    fn tp_sweep_covers_one_through_ten() {
        let ds = tent_dataset(300);
        let points = tp_sweep(&ds, &["x"], "x", 2, 1, (0, 100), (150, 290), None);
        let params: Vec<i64> = points.iter().map(|p| p.param).collect();
        assert_eq!(params, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn theta_sweep_covers_the_fixed_grid() {
        let ds = tent_dataset(300);
        let points = theta_sweep(&ds, &["x"], "x", 2, 1, 1, (0, 100), (150, 290), 1e-5, None).unwrap();
        assert_eq!(points.len(), THETA_GRID.len());
    }

    #[test]
    fn zero_timeout_yields_empty_or_partial_results_without_panicking() {
        let ds = tent_dataset(200);
        let points = e_sweep(&ds, &["x"], "x", (0, 50), (60, 190), 1, Some(Duration::from_nanos(1)));
        assert!(points.len() <= 10);
    }
}
