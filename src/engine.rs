use std::time::Instant;

use crate::cluster::{Labeler, Labeling};
use crate::config::{Params, validate_probability, validate_shape};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::heatmap::{HeatScale, SiteRow};
use crate::occupancy;
use crate::rng::SimRng;
use crate::stats::ClusterStats;
use crate::topology::{Boundary, NeighborTopology};

/// Wall time of one trial stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// One percolation simulation: a lattice, its generator, and the state of the
/// latest trial.
///
/// Construction runs a first trial, so every accessor is valid from the start.
/// The generator is seeded once and advances across trials and
/// reinitializations.
pub struct Percolation {
    params: Params,
    topology: NeighborTopology,
    rng: SimRng,
    occupancy: Grid<bool>,
    labeling: Labeling,
    stats: ClusterStats,
    timings: Vec<Timing>,
}

impl Percolation {
    pub fn new(params: Params) -> Result<Self, ConfigError> {
        params.validate()?;
        let (nx, ny) = (params.nx, params.ny);
        let mut sim = Self {
            topology: NeighborTopology::build_validated(nx, ny, params.boundary),
            rng: params.seed.make_rng(),
            occupancy: Grid::new(nx, ny),
            labeling: Labeling {
                ids: Grid::new(nx, ny),
                passes: 0,
            },
            stats: ClusterStats::default(),
            timings: Vec::new(),
            params,
        };
        log::debug!(
            "percolation {}x{} p={} boundary={:?} labeler={:?}",
            nx,
            ny,
            sim.params.p,
            sim.params.boundary,
            sim.params.labeler
        );
        sim.trial();
        Ok(sim)
    }

    /// Change shape and/or occupation probability, then run a fresh trial.
    ///
    /// The topology is rebuilt whenever the requested shape differs from the
    /// current one. Nothing changes if validation fails.
    pub fn reinitialize(&mut self, nx: usize, ny: usize, p: f64) -> Result<&mut Self, ConfigError> {
        validate_shape(nx, ny)?;
        validate_probability(p)?;

        self.params.p = p;
        if (self.params.nx, self.params.ny) != (nx, ny) {
            log::debug!(
                "reshaping lattice {}x{} -> {}x{}",
                self.params.nx,
                self.params.ny,
                nx,
                ny
            );
            self.params.nx = nx;
            self.params.ny = ny;
            self.occupancy = Grid::new(nx, ny);
        }
        self.reconcile_topology();
        Ok(self.trial())
    }

    /// Swap the boundary policy and relabel the current occupancy.
    pub fn set_boundary(&mut self, boundary: Boundary) -> &mut Self {
        self.params.boundary = boundary;
        self.reconcile_topology();
        self.timings.clear();
        self.relabel();
        self
    }

    /// Swap the labeling algorithm and relabel the current occupancy.
    pub fn set_labeler(&mut self, labeler: Labeler) -> &mut Self {
        self.params.labeler = labeler;
        self.timings.clear();
        self.relabel();
        self
    }

    /// Resample occupancy, relabel clusters and recompute statistics.
    pub fn trial(&mut self) -> &mut Self {
        self.timings.clear();

        let t = Instant::now();
        occupancy::resample(&mut self.occupancy, self.params.p, &mut self.rng);
        self.timings.push(Timing {
            name: "sample",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        self.relabel();

        log::debug!(
            "trial: occupied={} clusters={} max={} passes={} spanning={}",
            self.stats.occupied_sites(),
            self.stats.cluster_count(),
            self.stats.max_size,
            self.labeling.passes,
            self.stats.spanning
        );
        for t in &self.timings {
            log::trace!("  {:10} {:8.3} ms", t.name, t.ms);
        }
        self
    }

    /// Run `n` trials and collect whether each one spanned.
    pub fn spanning_trials(&mut self, n: usize) -> Vec<bool> {
        (0..n).map(|_| self.trial().is_spanning()).collect()
    }

    fn relabel(&mut self) {
        if !self
            .topology
            .matches(self.params.nx, self.params.ny, self.params.boundary)
        {
            debug_assert!(false, "stale neighbor topology reached the labeler");
            log::warn!("stale neighbor topology, rebuilding");
            self.reconcile_topology();
        }

        let t = Instant::now();
        self.labeling = self.params.labeler.label(&self.occupancy, &self.topology);
        self.timings.push(Timing {
            name: "label",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        let t = Instant::now();
        self.stats = ClusterStats::summarize(&self.labeling.ids);
        self.timings.push(Timing {
            name: "summarize",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
    }

    fn reconcile_topology(&mut self) {
        let Params { nx, ny, boundary, .. } = self.params;
        if !self.topology.matches(nx, ny, boundary) {
            self.topology = NeighborTopology::build_validated(nx, ny, boundary);
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.params.nx, self.params.ny)
    }

    pub fn num_sites(&self) -> usize {
        self.params.nx * self.params.ny
    }

    pub fn p(&self) -> f64 {
        self.params.p
    }

    pub fn topology(&self) -> &NeighborTopology {
        &self.topology
    }

    pub fn occupancy(&self) -> &Grid<bool> {
        &self.occupancy
    }

    /// Converged cluster ids; 0 marks an unoccupied site.
    pub fn clusters(&self) -> &Grid<u32> {
        &self.labeling.ids
    }

    pub fn stats(&self) -> &ClusterStats {
        &self.stats
    }

    pub fn max_cluster_size(&self) -> usize {
        self.stats.max_size
    }

    pub fn is_spanning(&self) -> bool {
        self.stats.spanning
    }

    /// Labeler passes in the latest trial, including the final unchanged pass.
    pub fn passes(&self) -> usize {
        self.labeling.passes
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    pub fn cluster_id_at(&self, i: usize, j: usize) -> u32 {
        self.labeling.ids.get(i, j)
    }

    pub fn cluster_size_at(&self, i: usize, j: usize) -> usize {
        self.stats.size_of(self.cluster_id_at(i, j))
    }

    /// Share of the lattice covered by the cluster containing (i, j).
    pub fn cluster_fraction_at(&self, i: usize, j: usize) -> f64 {
        self.stats.fraction_of(self.cluster_id_at(i, j))
    }

    /// One row per site, row-major, for heatmap rendering.
    pub fn heatmap_rows(&self, scale: HeatScale) -> Vec<SiteRow> {
        crate::heatmap::site_rows(&self.labeling.ids, &self.stats, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Seed;

    fn seeded(nx: usize, ny: usize, p: f64) -> Percolation {
        Percolation::new(Params::new(nx, ny, p).with_seed(11)).unwrap()
    }

    #[test]
    fn construction_runs_a_trial() {
        let sim = seeded(6, 6, 1.0);
        assert_eq!(sim.max_cluster_size(), 36);
        assert!(sim.is_spanning());
        assert!(sim.passes() >= 1);
        let stages: Vec<&str> = sim.timings().iter().map(|t| t.name).collect();
        assert_eq!(stages, ["sample", "label", "summarize"]);
        let copy = sim.timings().to_vec();
        assert_eq!(format!("{:?}", copy[0]), format!("{:?}", sim.timings()[0]));
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(Percolation::new(Params::new(4, 4, 1.2)).is_err());
        assert!(Percolation::new(Params::new(0, 4, 0.5)).is_err());
    }

    #[test]
    fn reinitialize_rebuilds_topology_on_shape_change() {
        let mut sim = seeded(4, 4, 0.5);
        sim.reinitialize(7, 3, 0.5).unwrap();
        assert_eq!(sim.topology().shape(), (7, 3));
        assert_eq!(sim.occupancy().shape(), (7, 3));
        assert_eq!(sim.clusters().shape(), (7, 3));

        // Only one dimension changes.
        sim.reinitialize(7, 5, 0.5).unwrap();
        assert_eq!(sim.topology().shape(), (7, 5));
    }

    #[test]
    fn reinitialize_updates_p_and_keeps_state_on_error() {
        let mut sim = seeded(5, 5, 0.5);
        sim.reinitialize(5, 5, 0.0).unwrap();
        assert_eq!(sim.p(), 0.0);
        assert_eq!(sim.max_cluster_size(), 0);

        assert_eq!(
            sim.reinitialize(9, 9, -0.1).err(),
            Some(ConfigError::InvalidProbability(-0.1))
        );
        assert_eq!(sim.shape(), (5, 5));
        assert_eq!(sim.p(), 0.0);
    }

    #[test]
    fn same_seed_same_trials() {
        let mut a = seeded(10, 10, 0.6);
        let mut b = seeded(10, 10, 0.6);
        for _ in 0..5 {
            assert_eq!(a.trial().clusters(), b.trial().clusters());
        }
    }

    #[test]
    fn trials_advance_the_generator() {
        let mut sim = seeded(10, 10, 0.5);
        let first = sim.occupancy().clone();
        sim.trial();
        assert_ne!(&first, sim.occupancy());
    }

    #[test]
    fn swapping_labeler_keeps_partition() {
        let mut sim = seeded(12, 12, 0.59);
        let before = sim.clusters().clone();
        sim.set_labeler(Labeler::UnionFind);
        assert_eq!(&before, sim.clusters());
        assert_eq!(sim.passes(), 1);
    }

    #[test]
    fn boundary_swap_rebuilds_topology() {
        let mut sim = Percolation::new(Params {
            seed: Seed::Fixed(3),
            ..Params::new(1, 4, 1.0)
        })
        .unwrap();
        assert_eq!(sim.max_cluster_size(), 4);
        sim.set_boundary(Boundary::Clamped);
        assert_eq!(sim.topology().boundary(), Boundary::Clamped);
        // Still a straight line of four occupied sites.
        assert_eq!(sim.max_cluster_size(), 4);
    }

    #[test]
    fn spanning_trials_counts_each_trial() {
        let mut sim = seeded(8, 8, 1.0);
        assert_eq!(sim.spanning_trials(4), vec![true; 4]);
        sim.reinitialize(8, 8, 0.0).unwrap();
        assert_eq!(sim.spanning_trials(3), vec![false; 3]);
    }

    #[test]
    fn per_site_accessors() {
        let sim = seeded(3, 3, 1.0);
        assert_eq!(sim.cluster_id_at(2, 2), 1);
        assert_eq!(sim.cluster_size_at(0, 1), 9);
        assert!((sim.cluster_fraction_at(1, 1) - 1.0).abs() < 1e-12);
    }
}
