use serde::{Deserialize, Serialize};

use crate::cluster::Labeler;
use crate::error::ConfigError;
use crate::rng::Seed;
use crate::topology::Boundary;

/// Lattice and trial parameters for one engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub nx: usize,
    pub ny: usize,
    /// Site occupation probability.
    pub p: f64,
    pub seed: Seed,
    pub boundary: Boundary,
    pub labeler: Labeler,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            nx: 20,
            ny: 20,
            p: 0.593,
            seed: Seed::Entropy,
            boundary: Boundary::Periodic,
            labeler: Labeler::Relaxation,
        }
    }
}

impl Params {
    pub fn new(nx: usize, ny: usize, p: f64) -> Self {
        Self {
            nx,
            ny,
            p,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Seed::Fixed(seed);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_labeler(mut self, labeler: Labeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_shape(self.nx, self.ny)?;
        validate_probability(self.p)
    }
}

/// Both dimensions positive, and the empty-site sentinel `nx * ny + 1` fits in a `u32`.
pub fn validate_shape(nx: usize, ny: usize) -> Result<(), ConfigError> {
    if nx == 0 || ny == 0 {
        return Err(ConfigError::EmptyLattice { nx, ny });
    }
    match nx.checked_mul(ny).and_then(|n| n.checked_add(1)) {
        Some(n) if n <= u32::MAX as usize => Ok(()),
        _ => Err(ConfigError::LatticeTooLarge { nx, ny }),
    }
}

/// Rejects rather than clamps: a clamped p would silently skew spanning statistics.
pub fn validate_probability(p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability(p))
    }
}
