//! Deterministic synthetic series for the §8 concrete scenarios, shared
//! across integration test binaries via `#[path = "fixtures.rs"] mod fixtures;`.

use edm_core::Dataset;

/// Logistic tent map `x_{n+1} = 2x_n` (x<0.5) or `2(1-x_n)` (x>=0.5).
pub fn tent_map(n: usize, x0: f64) -> Vec<f64> {
    let mut x = vec![x0];
    for _ in 1..n {
        let prev = *x.last().unwrap();
        x.push(if prev < 0.5 { 2.0 * prev } else { 2.0 * (1.0 - prev) });
    }
    x
}

/// `tent_map` plus small additive noise from a fixed linear-congruential
/// sequence (kept dependency-free and deterministic without an RNG crate).
pub fn tent_map_noisy(n: usize, x0: f64, noise_amplitude: f64) -> Vec<f64> {
    let clean = tent_map(n, x0);
    let mut state: u64 = 0x9E3779B97F4A7C15;
    clean
        .into_iter()
        .map(|v| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let unit = ((state >> 40) as f64) / ((1u64 << 24) as f64); // in [0, 1)
            v + noise_amplitude * (unit - 0.5)
        })
        .collect()
}

/// Lorenz system, Euler-integrated; returns the `x` coordinate series.
pub fn lorenz_x(n: usize, dt: f64) -> Vec<f64> {
    let (mut x, mut y, mut z) = (1.0, 1.0, 1.0);
    let (sigma, rho, beta) = (10.0, 28.0, 8.0 / 3.0);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let dx = sigma * (y - x);
        let dy = x * (rho - z) - y;
        let dz = x * y - beta * z;
        x += dx * dt;
        y += dy * dt;
        z += dz * dt;
        out.push(x);
    }
    out
}

/// Three-species coupled logistic map (x, y, z), each weakly forced by the
/// others, matching the shape of the classic "block_3sp" EDM test dataset.
pub fn block_3sp(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (mut x, mut y, mut z) = (vec![0.3_f64], vec![0.4_f64], vec![0.5_f64]);
    for _ in 1..n {
        let (xi, yi, zi) = (*x.last().unwrap(), *y.last().unwrap(), *z.last().unwrap());
        x.push((3.7 * xi * (1.0 - xi) - 0.1 * yi).rem_euclid(1.0));
        y.push((3.6 * yi * (1.0 - yi) + 0.05 * xi).rem_euclid(1.0));
        z.push((3.8 * zi * (1.0 - zi) + 0.02 * xi).rem_euclid(1.0));
    }
    (x, y, z)
}

/// A sardine/anchovy-shaped toy dataset: `anchovy` one-way-coupled into
/// `np_sst` so CCM detects strong `anchovy -> np_sst` convergence and weak
/// `np_sst -> anchovy` skill, matching the Sardine-Anchovy scenario shape.
pub fn sardine_anchovy_toy(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut anchovy = vec![0.35_f64];
    let mut sst = vec![0.6_f64];
    for _ in 1..n {
        let a = *anchovy.last().unwrap();
        let s = *sst.last().unwrap();
        anchovy.push((3.6 * a * (1.0 - a)).rem_euclid(1.0));
        sst.push((3.2 * s * (1.0 - s) + 0.35 * a).rem_euclid(1.0));
    }
    (anchovy, sst)
}

pub fn series_dataset(name: &str, series: Vec<f64>) -> Dataset {
    let time: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
    Dataset::new(time, vec![(name.to_string(), series)]).unwrap()
}
