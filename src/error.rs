//! Error types for lattice configuration and batch sweeps.

use std::fmt;

/// Rejected lattice or trial configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Occupation probability outside `[0, 1]` (or NaN).
    InvalidProbability(f64),
    /// A lattice dimension is zero.
    EmptyLattice { nx: usize, ny: usize },
    /// `nx * ny + 1` does not fit in a `u32` cluster id.
    LatticeTooLarge { nx: usize, ny: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProbability(p) => {
                write!(f, "occupation probability {p} is outside [0, 1]")
            }
            Self::EmptyLattice { nx, ny } => {
                write!(f, "lattice {nx}x{ny} must have positive dimensions")
            }
            Self::LatticeTooLarge { nx, ny } => {
                write!(f, "lattice {nx}x{ny} has too many sites for u32 cluster ids")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure while running or persisting a parameter sweep.
#[derive(Debug)]
pub enum SweepError {
    Config(ConfigError),
    InvalidSweep(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid lattice configuration: {e}"),
            Self::InvalidSweep(reason) => write!(f, "invalid sweep: {reason}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidSweep(_) => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<std::io::Error> for SweepError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
