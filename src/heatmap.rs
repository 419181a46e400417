//! Row-per-site projection of a labeled lattice, ready for a heatmap renderer.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::stats::ClusterStats;

/// Value used to color a site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatScale {
    /// Cluster size over total sites.
    #[default]
    Fraction,
    /// Natural log of the cluster size.
    LogSize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteRow {
    pub i: usize,
    pub j: usize,
    pub cluster_fraction: f64,
    pub cluster_size: usize,
    pub cluster_id: u32,
}

/// Build one row per site in row-major order. Unoccupied sites are all zeros.
pub fn site_rows(clusters: &Grid<u32>, stats: &ClusterStats, scale: HeatScale) -> Vec<SiteRow> {
    let num_sites = clusters.len() as f64;
    clusters
        .data
        .iter()
        .enumerate()
        .map(|(k, &id)| {
            let (i, j) = clusters.coords(k);
            let size = stats.size_of(id);
            let heat = match (id, scale) {
                (0, _) => 0.0,
                (_, HeatScale::Fraction) => size as f64 / num_sites,
                (_, HeatScale::LogSize) => (size as f64).ln(),
            };
            SiteRow {
                i,
                j,
                cluster_fraction: heat,
                cluster_size: size,
                cluster_id: id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Grid<u32>, ClusterStats) {
        let ids = Grid::from_vec(2, 3, vec![1, 1, 0, 4, 0, 1]);
        let stats = ClusterStats::summarize(&ids);
        (ids, stats)
    }

    #[test]
    fn fraction_rows() {
        let (ids, stats) = fixture();
        let rows = site_rows(&ids, &stats, HeatScale::Fraction);
        assert_eq!(rows.len(), 6);
        assert_eq!((rows[3].i, rows[3].j), (1, 0));
        assert_eq!(rows[3].cluster_id, 4);
        assert_eq!(rows[3].cluster_size, 1);
        assert!((rows[0].cluster_fraction - 0.5).abs() < 1e-12);
        assert_eq!(rows[2].cluster_fraction, 0.0);
        assert_eq!(rows[2].cluster_size, 0);
        assert_eq!(rows[2].cluster_id, 0);
    }

    #[test]
    fn log_rows() {
        let (ids, stats) = fixture();
        let rows = site_rows(&ids, &stats, HeatScale::LogSize);
        assert!((rows[5].cluster_fraction - 3f64.ln()).abs() < 1e-12);
        assert_eq!(rows[3].cluster_fraction, 0.0);
    }

    #[test]
    fn serializes_with_field_names() {
        let (ids, stats) = fixture();
        let rows = site_rows(&ids, &stats, HeatScale::Fraction);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["cluster_id"], 1);
        assert_eq!(json["cluster_size"], 3);
    }
}
