//! Site percolation on a square lattice.
//!
//! Sites are occupied independently with probability `p` and join their four
//! lattice neighbors (periodic by default) when both are occupied. Each trial
//! labels the connected clusters, ranks them by size and reports whether the
//! largest covers more than half the lattice.
//!
//! ```
//! use percolation::{Params, Percolation};
//!
//! let mut sim = Percolation::new(Params::new(32, 32, 0.593).with_seed(7)).unwrap();
//! for _ in 0..10 {
//!     sim.trial();
//!     assert!(sim.max_cluster_size() <= 32 * 32);
//! }
//! ```

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod heatmap;
pub mod occupancy;
pub mod rng;
pub mod stats;
pub mod sweep;
pub mod topology;

pub use cluster::{Labeler, Labeling};
pub use config::Params;
pub use engine::{Percolation, Timing};
pub use error::{ConfigError, SweepError};
pub use grid::Grid;
pub use heatmap::{HeatScale, SiteRow};
pub use rng::Seed;
pub use stats::ClusterStats;
pub use sweep::{SweepConfig, SweepResults, run_sweep};
pub use topology::{Boundary, NeighborTopology};
