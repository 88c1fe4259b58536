/*!
`edm`: command-line front-end for the `edm-core` Empirical Dynamic Modeling
engine.

Examples
  # time-delay embed column x at E=3, tau=2
  edm embed data.csv --columns x --target x -E 3 -u 2 --output embedded.csv

  # Simplex prediction, library [1,100], prediction [201,500]
  edm predict data.csv --columns x --target x -E 2 -T 1 --lib 1,100 --pred 201,500 --output pred.csv

  # convergent cross mapping between two columns
  edm ccm data.csv -c anchovy -r np_sst -E 3 -L 10,80,10 -s 100 -R --seed 7 --output ccm.csv
*/

mod csv_io;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use edm_core::ccm::{ccm, CCMParams};
use edm_core::embed::{embed, EmbedParams};
use edm_core::method::Method;
use edm_core::multiview::{multiview, MultiviewParams};
use edm_core::predict::{predict, PredictParams, Range};
use edm_core::smap::SMapParams;
use edm_core::sweep::{e_sweep, theta_sweep, tp_sweep};

#[derive(Parser, Debug)]
#[command(name = "edm")]
#[command(about = "Empirical Dynamic Modeling: embedding, Simplex/S-Map prediction, CCM, Multiview")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time-delay embed one or more columns
    Embed {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        #[arg(long)]
        forward: bool,
        #[arg(short = 'T', long = "tp", default_value_t = 0)]
        tp: i64,
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Simplex or S-Map prediction
    Predict {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        #[arg(long)]
        forward: bool,
        #[arg(short = 'T', long = "tp", default_value_t = 0)]
        tp: i64,
        #[arg(long, default_value = "simplex")]
        method: String,
        /// 1-based inclusive "lo,hi"
        #[arg(short = 'l', long)]
        lib: String,
        /// 1-based inclusive "lo,hi"
        #[arg(short = 'p', long)]
        pred: String,
        #[arg(short = 'k', long = "knn", default_value_t = 0)]
        knn: usize,
        #[arg(short = 't', long = "theta", default_value_t = 0.0)]
        theta: f64,
        #[arg(long = "svd-significance", default_value_t = 1e-5)]
        svd_significance: f64,
        /// "i:j" pairs, repeatable
        #[arg(short = 'j', long = "jacobians")]
        jacobians: Vec<String>,
        #[arg(short, long, default_value = "-")]
        output: String,
        #[arg(long)]
        smap_output: Option<String>,
    },

    /// Convergent Cross Mapping between two columns
    Ccm {
        input: String,
        #[arg(short = 'c', long)]
        column: String,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        /// "start,stop,step"
        #[arg(short = 'L', long = "libsize")]
        libsize: String,
        #[arg(short = 's', long = "subsample", default_value_t = 100)]
        subsample: usize,
        #[arg(short = 'R', long = "random-lib")]
        random_lib: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Multiview ensemble prediction
    Multiview {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        #[arg(short = 'T', long = "tp", default_value_t = 0)]
        tp: i64,
        #[arg(short = 'l', long)]
        lib: String,
        #[arg(short = 'p', long)]
        pred: String,
        #[arg(long = "multiview-k", default_value_t = 0)]
        multiview_k: usize,
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Parameter sweeps over E, Tp, or theta
    Sweep {
        #[command(subcommand)]
        kind: SweepKind,
    },
}

#[derive(Subcommand, Debug)]
enum SweepKind {
    E {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'T', long = "tp", default_value_t = 1)]
        tp: i64,
        #[arg(short = 'l', long)]
        lib: String,
        #[arg(short = 'p', long)]
        pred: String,
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    Tp {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        #[arg(short = 'l', long)]
        lib: String,
        #[arg(short = 'p', long)]
        pred: String,
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    Theta {
        input: String,
        #[arg(short = 'c', long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short = 'r', long)]
        target: String,
        #[arg(short = 'E', long = "dimension", default_value_t = 1)]
        dimension: usize,
        #[arg(short = 'u', long = "tau", default_value_t = 1)]
        tau: usize,
        #[arg(short = 'T', long = "tp", default_value_t = 1)]
        tp: i64,
        #[arg(long = "svd-significance", default_value_t = 1e-5)]
        svd_significance: f64,
        #[arg(short = 'l', long)]
        lib: String,
        #[arg(short = 'p', long)]
        pred: String,
        #[arg(short, long, default_value = "-")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Command::Embed { input, columns, target, dimension, tau, forward, tp, output } => {
            run_embed(&input, &columns, &target, dimension, tau, forward, tp, &output)
        }
        Command::Predict {
            input,
            columns,
            target,
            dimension,
            tau,
            forward,
            tp,
            method,
            lib,
            pred,
            knn,
            theta,
            svd_significance,
            jacobians,
            output,
            smap_output,
        } => run_predict(
            &input,
            &columns,
            &target,
            dimension,
            tau,
            forward,
            tp,
            &method,
            &lib,
            &pred,
            knn,
            theta,
            svd_significance,
            &jacobians,
            &output,
            smap_output.as_deref(),
        ),
        Command::Ccm { input, column, target, dimension, tau, libsize, subsample, random_lib, seed, output } => {
            run_ccm(&input, &column, &target, dimension, tau, &libsize, subsample, random_lib, seed, &output)
        }
        Command::Multiview { input, columns, target, dimension, tau, tp, lib, pred, multiview_k, output } => {
            run_multiview(&input, &columns, &target, dimension, tau, tp, &lib, &pred, multiview_k, &output)
        }
        Command::Sweep { kind } => run_sweep(kind),
    }
}

/// Parse a 1-based inclusive "lo,hi" pair into a half-open `(lo-1, hi)` range.
fn parse_range(s: &str) -> Result<Range> {
    let (lo, hi) = s.split_once(',').with_context(|| format!("expected 'lo,hi', got '{s}'"))?;
    let lo: usize = lo.trim().parse().with_context(|| format!("parsing lib/pred lower bound in '{s}'"))?;
    let hi: usize = hi.trim().parse().with_context(|| format!("parsing lib/pred upper bound in '{s}'"))?;
    if lo == 0 {
        bail!("lib/pred bounds are 1-based; lower bound must be >= 1");
    }
    Ok((lo - 1, hi))
}

fn parse_libsize(s: &str) -> Result<(usize, usize, usize)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        bail!("expected 'start,stop,step', got '{s}'");
    }
    Ok((parts[0].trim().parse()?, parts[1].trim().parse()?, parts[2].trim().parse()?))
}

fn parse_jacobian_pairs(pairs: &[String]) -> Result<Vec<(usize, usize)>> {
    pairs
        .iter()
        .map(|p| {
            let (i, j) = p.split_once(':').with_context(|| format!("expected 'i:j', got '{p}'"))?;
            Ok((i.trim().parse()?, j.trim().parse()?))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_embed(
    input: &str,
    columns: &[String],
    target: &str,
    e: usize,
    tau: usize,
    forward: bool,
    tp: i64,
    output: &str,
) -> Result<()> {
    let dataset = csv_io::read_dataset(input)?;
    let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
    let params = EmbedParams { e, tau, forward, tp };
    let (m, names, _y) = embed(&dataset, &cols, target, &params)?;

    let rows: Vec<Vec<f64>> = (0..m.nrows()).map(|r| m.row(r).to_vec()).collect();
    csv_io::write_table(output, &names, &rows)
}

#[allow(clippy::too_many_arguments)]
fn run_predict(
    input: &str,
    columns: &[String],
    target: &str,
    e: usize,
    tau: usize,
    forward: bool,
    tp: i64,
    method: &str,
    lib: &str,
    pred: &str,
    knn: usize,
    theta: f64,
    svd_significance: f64,
    jacobians: &[String],
    output: &str,
    smap_output_path: Option<&str>,
) -> Result<()> {
    let dataset = csv_io::read_dataset(input)?;
    let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
    let embed_params = EmbedParams { e, tau, forward, tp };
    let (m, _names, y) = embed(&dataset, &cols, target, &embed_params)?;

    let lib_range = parse_range(lib)?;
    let pred_range = parse_range(pred)?;
    let jacobian_pairs = parse_jacobian_pairs(jacobians)?;

    let method = match method.to_ascii_lowercase().as_str() {
        "simplex" => Method::Simplex,
        "smap" | "s-map" => Method::SMap(SMapParams { theta, svd_significance, jacobian_pairs }),
        other => bail!("unknown method '{other}', expected 'simplex' or 'smap'"),
    };

    let predict_params = PredictParams {
        method,
        lib: lib_range,
        pred: pred_range,
        k: knn,
        exclusion_radius: 0,
        tp,
    };
    let out = predict(m.view(), &y, &predict_params)?;

    let rows: Vec<Vec<f64>> = (0..out.output.nrows()).map(|r| out.output.row(r).to_vec()).collect();
    csv_io::write_table(output, &out.header, &rows)?;

    tracing::info!(rho = out.stats.rho, rmse = out.stats.rmse, mae = out.stats.mae, "prediction complete");

    if let (Some(path), Some(smap)) = (smap_output_path, out.smap_output) {
        let rows: Vec<Vec<f64>> = (0..smap.table.nrows()).map(|r| smap.table.row(r).to_vec()).collect();
        csv_io::write_table(path, &smap.header, &rows)?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_ccm(
    input: &str,
    column: &str,
    target: &str,
    e: usize,
    tau: usize,
    libsize: &str,
    subsample: usize,
    random_lib: bool,
    seed: Option<u64>,
    output: &str,
) -> Result<()> {
    let dataset = csv_io::read_dataset(input)?;
    let params = CCMParams {
        e,
        tau,
        tp: 0,
        lib_sizes: parse_libsize(libsize)?,
        sample: subsample,
        random_lib,
        seed,
        exclusion_radius: 0,
    };
    let (col_to_targ, targ_to_col) = ccm(&dataset, column, target, &params)?;

    let header = vec![
        "lib_size".to_string(),
        format!("rho_{column}_to_{target}"),
        format!("rho_{target}_to_{column}"),
    ];
    let rows: Vec<Vec<f64>> = col_to_targ
        .keys()
        .map(|&size| {
            vec![
                size as f64,
                col_to_targ.get(&size).map(|s| s.rho).unwrap_or(f64::NAN),
                targ_to_col.get(&size).map(|s| s.rho).unwrap_or(f64::NAN),
            ]
        })
        .collect();
    csv_io::write_table(output, &header, &rows)
}

#[allow(clippy::too_many_arguments)]
fn run_multiview(
    input: &str,
    columns: &[String],
    target: &str,
    e: usize,
    tau: usize,
    tp: i64,
    lib: &str,
    pred: &str,
    multiview_k: usize,
    output: &str,
) -> Result<()> {
    let dataset = csv_io::read_dataset(input)?;
    let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
    let params = MultiviewParams {
        e,
        tau,
        tp,
        lib: parse_range(lib)?,
        pred: parse_range(pred)?,
        top_k: multiview_k,
    };
    let out = multiview(&dataset, &cols, target, &params)?;

    let rows: Vec<Vec<f64>> = (0..out.output.nrows()).map(|r| out.output.row(r).to_vec()).collect();
    csv_io::write_table(output, &out.header, &rows)?;
    tracing::info!(rho = out.stats.rho, subsets = out.top_subsets.len(), "multiview complete");
    Ok(())
}

fn run_sweep(kind: SweepKind) -> Result<()> {
    match kind {
        SweepKind::E { input, columns, target, tp, lib, pred, output } => {
            let dataset = csv_io::read_dataset(&input)?;
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            let points = e_sweep(&dataset, &cols, &target, parse_range(&lib)?, parse_range(&pred)?, tp, None);
            let header = vec!["E".to_string(), "rho".to_string(), "rmse".to_string(), "mae".to_string()];
            let rows: Vec<Vec<f64>> =
                points.iter().map(|p| vec![p.param as f64, p.stats.rho, p.stats.rmse, p.stats.mae]).collect();
            csv_io::write_table(&output, &header, &rows)
        }
        SweepKind::Tp { input, columns, target, dimension, tau, lib, pred, output } => {
            let dataset = csv_io::read_dataset(&input)?;
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            let points =
                tp_sweep(&dataset, &cols, &target, dimension, tau, parse_range(&lib)?, parse_range(&pred)?, None);
            let header = vec!["Tp".to_string(), "rho".to_string(), "rmse".to_string(), "mae".to_string()];
            let rows: Vec<Vec<f64>> =
                points.iter().map(|p| vec![p.param as f64, p.stats.rho, p.stats.rmse, p.stats.mae]).collect();
            csv_io::write_table(&output, &header, &rows)
        }
        SweepKind::Theta { input, columns, target, dimension, tau, tp, svd_significance, lib, pred, output } => {
            let dataset = csv_io::read_dataset(&input)?;
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            let points = theta_sweep(
                &dataset,
                &cols,
                &target,
                dimension,
                tau,
                tp,
                parse_range(&lib)?,
                parse_range(&pred)?,
                svd_significance,
                None,
            )?;
            let header = vec!["theta".to_string(), "rho".to_string(), "rmse".to_string(), "mae".to_string()];
            let rows: Vec<Vec<f64>> =
                points.iter().map(|p| vec![p.param, p.stats.rho, p.stats.rmse, p.stats.mae]).collect();
            csv_io::write_table(&output, &header, &rows)
        }
    }
}
