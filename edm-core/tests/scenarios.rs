//! Integration tests for the six concrete scenarios.

#[path = "fixtures.rs"]
mod fixtures;

use edm_core::ccm::{ccm, CCMParams};
use edm_core::dataset::Dataset;
use edm_core::embed::{embed, EmbedParams};
use edm_core::method::Method;
use edm_core::multiview::{multiview, MultiviewParams};
use edm_core::predict::{predict, PredictParams};
use edm_core::smap::SMapParams;
use edm_core::sweep::{e_sweep, theta_sweep};

use fixtures::{block_3sp, lorenz_x, sardine_anchovy_toy, series_dataset, tent_map, tent_map_noisy};

#[test]
fn tent_map_e_sweep_simplex_peaks_at_e_two() {
    let ds = series_dataset("x", tent_map(500, 0.1));
    let points = e_sweep(&ds, &["x"], "x", (0, 100), (200, 500), 1, None);

    let rho_at = |e: usize| points.iter().find(|p| p.param == e).map(|p| p.stats.rho);
    let rho_e2 = rho_at(2).expect("E=2 present");
    assert!(rho_e2 >= 0.95, "rho(E=2) = {rho_e2}");

    let best = points.iter().max_by(|a, b| a.stats.rho.partial_cmp(&b.stats.rho).unwrap()).unwrap();
    assert!(best.param <= 3, "peak should be near E=2, got E={}", best.param);

    if let Some(rho_e10) = rho_at(10) {
        assert!(rho_e10 < 0.7, "rho(E=10) = {rho_e10} should have degraded");
    }
}

#[test]
fn tent_map_noisy_theta_sweep_smap_shows_nonlinearity() {
    let ds = series_dataset("x", tent_map_noisy(500, 0.1, 0.05));
    let points = theta_sweep(&ds, &["x"], "x", 2, 1, 1, (0, 100), (200, 480), 1e-5, None).unwrap();

    let rho_zero = points.iter().find(|p| p.param == 0.01).map(|p| p.stats.rho).unwrap();
    let best = points.iter().max_by(|a, b| a.stats.rho.partial_cmp(&b.stats.rho).unwrap()).unwrap();

    assert!(best.param > 0.0 && best.param < 3.0 + 1e-9, "expected peak in (0,3), got theta={}", best.param);
    assert!(rho_zero < best.stats.rho, "rho(theta~0)={} should be below peak {}", rho_zero, best.stats.rho);
}

#[test]
fn block_3sp_multivariate_smap() {
    let (x, y, z) = block_3sp(250);
    let ds = Dataset::new((0..250).map(|i| i as f64).collect(), vec![
        ("x".to_string(), x),
        ("y".to_string(), y),
        ("z".to_string(), z),
    ])
    .unwrap();

    let embed_params = EmbedParams { e: 3, tau: 1, forward: false, tp: 1 };
    let (m, _names, target) = embed(&ds, &["x", "y", "z"], "x", &embed_params).unwrap();

    let predict_params = PredictParams {
        method: Method::SMap(SMapParams { theta: 2.0, svd_significance: 1e-5, jacobian_pairs: vec![] }),
        lib: (0, 99.min(m.nrows())),
        pred: (99.min(m.nrows()), m.nrows()),
        k: 0,
        exclusion_radius: 0,
        tp: 1,
    };
    let out = predict(m.view(), &target, &predict_params).unwrap();

    assert!(out.stats.rho > 0.7, "rho = {}", out.stats.rho);
    let smap = out.smap_output.expect("S-Map output present");
    assert_eq!(smap.header.len(), 1 + 4); // time + bias + 3 coefficients
}

#[test]
fn sardine_anchovy_ccm_shows_convergence() {
    let (anchovy, sst) = sardine_anchovy_toy(400);
    let ds = Dataset::new((0..400).map(|i| i as f64).collect(), vec![
        ("anchovy".to_string(), anchovy),
        ("np_sst".to_string(), sst),
    ])
    .unwrap();

    let params = CCMParams {
        e: 3,
        tau: 1,
        tp: 0,
        lib_sizes: (10, 80, 10),
        sample: 50,
        random_lib: true,
        seed: Some(7),
        exclusion_radius: 0,
    };
    let (anchovy_to_sst, sst_to_anchovy) = ccm(&ds, "anchovy", "np_sst", &params).unwrap();

    let rho_at_10 = anchovy_to_sst.get(&10).map(|s| s.rho).unwrap();
    let rho_at_80 = anchovy_to_sst.get(&80).map(|s| s.rho).unwrap();
    assert!(rho_at_80 > rho_at_10, "anchovy->np_sst should converge upward: {rho_at_10} -> {rho_at_80}");

    let reverse_at_80 = sst_to_anchovy.get(&80).map(|s| s.rho).unwrap();
    assert!(rho_at_80 > reverse_at_80, "forward direction should exceed reverse at L=80");
}

#[test]
fn lorenz_single_variable_smap_prediction() {
    let series = lorenz_x(1000, 0.01);
    let ds = series_dataset("v1", series);

    let embed_params = EmbedParams { e: 5, tau: 1, forward: false, tp: 1 };
    let (m, _names, y) = embed(&ds, &["v1"], "v1", &embed_params).unwrap();

    let predict_params = PredictParams {
        method: Method::SMap(SMapParams { theta: 3.0, svd_significance: 1e-5, jacobian_pairs: vec![] }),
        lib: (0, 300.min(m.nrows())),
        pred: (300.min(m.nrows()), m.nrows()),
        k: 0,
        exclusion_radius: 0,
        tp: 1,
    };
    let out = predict(m.view(), &y, &predict_params).unwrap();
    assert!(out.stats.rho > 0.9, "rho = {}", out.stats.rho);
}

#[test]
fn multiview_block_3sp_meets_or_beats_best_single_view() {
    let (x, y, z) = block_3sp(250);
    let ds = Dataset::new((0..250).map(|i| i as f64).collect(), vec![
        ("x".to_string(), x),
        ("y".to_string(), y),
        ("z".to_string(), z),
    ])
    .unwrap();

    let params = MultiviewParams { e: 3, tau: 1, tp: 1, lib: (0, 100), pred: (100, 200), top_k: 0 };
    let out = multiview(&ds, &["x", "y", "z"], "x", &params).unwrap();

    let best_single = out.top_subsets.iter().map(|s| s.stats.rho).fold(f64::MIN, f64::max);
    assert!(out.stats.rho >= best_single - 0.15, "multiview {} vs best single {}", out.stats.rho, best_single);
    assert!(out.stats.rho >= 0.6, "multiview rho too low: {}", out.stats.rho);
}
