//! Batch estimate of spanning probability over a grid of (L, p) points.
//!
//! Each job owns one `L`x`L` engine and runs many trials to amortize the
//! topology build. Jobs run in parallel with rayon and share nothing; their
//! spanning outcomes are pooled per (L, p) afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::Labeler;
use crate::config::{Params, validate_probability, validate_shape};
use crate::engine::Percolation;
use crate::error::{ConfigError, SweepError};
use crate::rng::{Seed, derive_seed};
use crate::topology::Boundary;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Linear system sizes; each is run on an `L`x`L` lattice.
    pub sizes: Vec<usize>,
    pub p_start: f64,
    /// Exclusive upper end of the p range.
    pub p_stop: f64,
    pub p_step: f64,
    pub trials_per_job: usize,
    pub jobs_per_point: usize,
    pub seed: Seed,
    pub boundary: Boundary,
    pub labeler: Labeler,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sizes: vec![10, 15, 20, 25, 30, 35, 40],
            p_start: 0.50,
            p_stop: 0.65,
            p_step: 0.01,
            trials_per_job: 50,
            jobs_per_point: 20,
            seed: Seed::Entropy,
            boundary: Boundary::Periodic,
            labeler: Labeler::Relaxation,
        }
    }
}

impl SweepConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Number of p points in `[p_start, p_stop)`, or `None` for an empty or
    /// inverted range or a non-positive step.
    pub fn point_count(&self) -> Option<usize> {
        if !(self.p_step > 0.0) || !(self.p_stop > self.p_start) {
            return None;
        }
        let count = ((self.p_stop - self.p_start) / self.p_step - 1e-9).ceil();
        if !(count >= 1.0) {
            return None;
        }
        // Saturates for absurd steps; callers compare against MAX_P_POINTS.
        Some(count.min(usize::MAX as f64) as usize)
    }

    /// p values from `p_start` up to but excluding `p_stop`. Empty when the
    /// range is invalid or holds more than [`MAX_P_POINTS`] values.
    pub fn probabilities(&self) -> Vec<f64> {
        match self.point_count() {
            Some(count) if count <= MAX_P_POINTS => (0..count)
                // Index-based to avoid accumulating step error.
                .map(|k| round_to(self.p_start + k as f64 * self.p_step, 12))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Decimal places needed to print every p point exactly: enough for both
    /// the start and the step.
    pub fn key_decimals(&self) -> usize {
        decimals_of(self.p_start).max(decimals_of(self.p_step))
    }

    /// File key for one p value.
    pub fn p_key(&self, p: f64) -> String {
        let decimals = self.key_decimals();
        format!("{p:.decimals$}")
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.sizes.is_empty() {
            return Err(SweepError::InvalidSweep("no system sizes".into()));
        }
        for &l in &self.sizes {
            validate_shape(l, l)?;
        }
        if !(self.p_step > 0.0) {
            return Err(SweepError::InvalidSweep(format!(
                "p_step must be positive, got {}",
                self.p_step
            )));
        }
        match self.point_count() {
            None => {
                return Err(SweepError::InvalidSweep(format!(
                    "empty p range [{}, {})",
                    self.p_start, self.p_stop
                )));
            }
            Some(count) if count > MAX_P_POINTS => {
                return Err(SweepError::InvalidSweep(format!(
                    "p range [{}, {}) with step {} has more than {MAX_P_POINTS} points",
                    self.p_start, self.p_stop, self.p_step
                )));
            }
            Some(_) => {}
        }
        let ps = self.probabilities();
        for &p in &ps {
            validate_probability(p)?;
        }
        let keys: BTreeSet<String> = ps.iter().map(|&p| self.p_key(p)).collect();
        if keys.len() != ps.len() {
            return Err(SweepError::InvalidSweep(format!(
                "p values collide when printed with {} decimals",
                self.key_decimals()
            )));
        }
        if self.trials_per_job == 0 || self.jobs_per_point == 0 {
            return Err(SweepError::InvalidSweep(
                "trials_per_job and jobs_per_point must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Upper bound on p points per system size.
pub const MAX_P_POINTS: usize = 100_000;

/// Fewest decimal places that print `x` without loss, capped at 12.
fn decimals_of(x: f64) -> usize {
    (0..12)
        .find(|&d| (round_to(x, d as i32) - x).abs() <= 1e-9 * x.abs())
        .unwrap_or(12)
}

#[inline]
fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

#[derive(Clone, Copy, Debug)]
struct Job {
    l: usize,
    p_index: usize,
    p: f64,
    replica: usize,
}

/// Pooled outcome for one (L, p) point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub p: f64,
    pub key: String,
    pub trials: usize,
    pub spanned: usize,
}

impl SweepPoint {
    pub fn probability(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.spanned as f64 / self.trials as f64
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SweepResults {
    /// Points per system size, in ascending p order.
    pub by_size: BTreeMap<usize, Vec<SweepPoint>>,
}

impl SweepResults {
    pub fn spanning_probability(&self, l: usize, key: &str) -> Option<f64> {
        self.by_size
            .get(&l)?
            .iter()
            .find(|pt| pt.key == key)
            .map(SweepPoint::probability)
    }

    /// p key -> spanning probability for one system size.
    pub fn table(&self, l: usize) -> BTreeMap<String, f64> {
        self.by_size
            .get(&l)
            .map(|pts| {
                pts.iter()
                    .map(|pt| (pt.key.clone(), pt.probability()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write one `{L}.json` per system size into `dir`, each a flat object
    /// mapping the p key to the spanning probability.
    pub fn write_json(&self, dir: &Path) -> Result<Vec<PathBuf>, SweepError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.by_size.len());
        for &l in self.by_size.keys() {
            let path = dir.join(format!("{l}.json"));
            let writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer(writer, &self.table(l))?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

pub fn run_sweep(cfg: &SweepConfig) -> Result<SweepResults, SweepError> {
    cfg.validate()?;
    let base_seed = match cfg.seed {
        Seed::Fixed(s) => s,
        Seed::Entropy => rand::random(),
    };
    let ps = cfg.probabilities();

    let mut jobs = Vec::with_capacity(cfg.sizes.len() * ps.len() * cfg.jobs_per_point);
    for replica in 0..cfg.jobs_per_point {
        for &l in &cfg.sizes {
            for (p_index, &p) in ps.iter().enumerate() {
                jobs.push(Job {
                    l,
                    p_index,
                    p,
                    replica,
                });
            }
        }
    }
    log::info!(
        "sweep: {} sizes x {} p values x {} jobs x {} trials",
        cfg.sizes.len(),
        ps.len(),
        cfg.jobs_per_point,
        cfg.trials_per_job
    );

    let start = Instant::now();
    let outcomes: Vec<(Job, Vec<bool>)> = jobs
        .par_iter()
        .map(|&job| run_job(cfg, base_seed, job).map(|trials| (job, trials)))
        .collect::<Result<_, ConfigError>>()?;
    log::info!(
        "sweep finished {} jobs in {:.1} ms",
        outcomes.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let mut by_size: BTreeMap<usize, Vec<SweepPoint>> = cfg
        .sizes
        .iter()
        .map(|&l| {
            let pts = ps
                .iter()
                .map(|&p| SweepPoint {
                    p,
                    key: cfg.p_key(p),
                    trials: 0,
                    spanned: 0,
                })
                .collect();
            (l, pts)
        })
        .collect();

    for (job, trials) in outcomes {
        if let Some(pt) = by_size.get_mut(&job.l).and_then(|pts| pts.get_mut(job.p_index)) {
            pt.trials += trials.len();
            pt.spanned += trials.iter().filter(|&&s| s).count();
        }
    }

    Ok(SweepResults { by_size })
}

fn run_job(cfg: &SweepConfig, base_seed: u64, job: Job) -> Result<Vec<bool>, ConfigError> {
    log::debug!("job L={} p={:.4} replica={}", job.l, job.p, job.replica);
    let seed = derive_seed(
        base_seed,
        &[job.l as u64, job.p_index as u64, job.replica as u64],
    );
    let params = Params {
        nx: job.l,
        ny: job.l,
        p: job.p,
        seed: Seed::Fixed(seed),
        boundary: cfg.boundary,
        labeler: cfg.labeler,
    };
    let mut sim = Percolation::new(params)?;
    Ok(sim.spanning_trials(cfg.trials_per_job))
}
