use std::path::{Path, PathBuf};
use std::process::ExitCode;

use percolation::{HeatScale, Params, Percolation, SweepConfig};

const USAGE: &str = "\
usage:
  percolation trial   [nx] [ny] [p] [seed] [trials]
  percolation heatmap [nx] [ny] [p] [seed] [log]
  percolation sweep   [out_dir] [config.json]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("trial") | None => run_trials(args.get(1..).unwrap_or_default()),
        Some("heatmap") => run_heatmap(&args[1..]),
        Some("sweep") => run_sweep(&args[1..]),
        Some(other) => {
            log::error!("unknown command {other:?}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn arg<T: std::str::FromStr>(args: &[String], i: usize, default: T) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Lattice params from positional `[nx] [ny] [p] [seed]`; no seed means entropy.
fn lattice_params(args: &[String]) -> Params {
    let defaults = Params::default();
    let params = Params::new(
        arg(args, 0, defaults.nx),
        arg(args, 1, defaults.ny),
        arg(args, 2, defaults.p),
    );
    match args.get(3).and_then(|s| s.parse().ok()) {
        Some(seed) => params.with_seed(seed),
        None => params,
    }
}

fn run_trials(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let params = lattice_params(args);
    let trials: usize = arg(args, 4, 1);

    log::info!(
        "{}x{} lattice, p={}, {} trial(s)",
        params.nx,
        params.ny,
        params.p,
        trials
    );
    let mut sim = Percolation::new(params)?;

    let mut spanned = 0usize;
    let mut max_passes = 0usize;
    for t in 0..trials {
        if t > 0 {
            sim.trial();
        }
        let stats = sim.stats();
        log::info!(
            "trial {:4}: clusters={:5} largest={:6} ({:.3}) passes={:4} spanning={}",
            t,
            stats.cluster_count(),
            stats.max_size,
            stats.max_fraction(),
            sim.passes(),
            stats.spanning
        );
        spanned += usize::from(stats.spanning);
        max_passes = max_passes.max(sim.passes());
    }

    println!(
        "spanning {spanned}/{trials} ({:.3}), max passes {max_passes}",
        spanned as f64 / trials.max(1) as f64
    );
    Ok(())
}

fn run_heatmap(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let scale = match args.get(4).map(String::as_str) {
        Some("log") => HeatScale::LogSize,
        _ => HeatScale::Fraction,
    };
    let sim = Percolation::new(lattice_params(args))?;
    log::info!(
        "largest cluster {} of {} sites",
        sim.max_cluster_size(),
        sim.num_sites()
    );
    println!("{}", serde_json::to_string(&sim.heatmap_rows(scale))?);
    Ok(())
}

fn run_sweep(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let out_dir: PathBuf = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("perc-prob-chart"));
    let cfg = match args.get(1) {
        Some(path) => SweepConfig::from_json_file(Path::new(path))?,
        None => SweepConfig::default(),
    };

    let results = percolation::run_sweep(&cfg)?;
    for (l, pts) in &results.by_size {
        let summary: Vec<String> = pts
            .iter()
            .map(|pt| format!("{}:{:.2}", pt.key, pt.probability()))
            .collect();
        log::info!("L={l:3} {}", summary.join(" "));
    }
    results.write_json(&out_dir)?;
    Ok(())
}
