use std::collections::BTreeMap;

use crate::grid::Grid;

/// Cluster sizes and spanning status for one converged cluster-id grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterStats {
    /// Site count per nonzero cluster id.
    pub sizes: BTreeMap<u32, usize>,
    /// `(id, size)` by size descending; equal sizes keep ascending id order.
    pub ranking: Vec<(u32, usize)>,
    /// Size of the largest cluster, 0 when nothing is occupied.
    pub max_size: usize,
    /// Largest cluster covers strictly more than half of the lattice.
    pub spanning: bool,
    pub num_sites: usize,
}

impl ClusterStats {
    pub fn summarize(clusters: &Grid<u32>) -> Self {
        let mut sizes = BTreeMap::new();
        for &id in clusters.data.iter().filter(|&&id| id != 0) {
            *sizes.entry(id).or_insert(0usize) += 1;
        }

        let mut ranking: Vec<(u32, usize)> = sizes.iter().map(|(&id, &n)| (id, n)).collect();
        // Stable sort over ascending ids: ties resolve to the lower id.
        ranking.sort_by(|a, b| b.1.cmp(&a.1));

        let num_sites = clusters.len();
        let max_size = ranking.first().map_or(0, |&(_, n)| n);

        Self {
            sizes,
            ranking,
            max_size,
            spanning: is_spanning(max_size, num_sites),
            num_sites,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.sizes.len()
    }

    /// Sum of all cluster sizes, i.e. the number of occupied sites.
    pub fn occupied_sites(&self) -> usize {
        self.sizes.values().sum()
    }

    pub fn size_of(&self, id: u32) -> usize {
        self.sizes.get(&id).copied().unwrap_or(0)
    }

    /// Share of the lattice covered by cluster `id`.
    pub fn fraction_of(&self, id: u32) -> f64 {
        if self.num_sites == 0 {
            return 0.0;
        }
        self.size_of(id) as f64 / self.num_sites as f64
    }

    pub fn max_fraction(&self) -> f64 {
        if self.num_sites == 0 {
            return 0.0;
        }
        self.max_size as f64 / self.num_sites as f64
    }
}

/// `max_size / num_sites > 0.5`, evaluated exactly in integers.
#[inline]
pub fn is_spanning(max_size: usize, num_sites: usize) -> bool {
    2 * max_size > num_sites
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_has_no_clusters() {
        let s = ClusterStats::summarize(&Grid::new(5, 5));
        assert!(s.sizes.is_empty());
        assert!(s.ranking.is_empty());
        assert_eq!(s.max_size, 0);
        assert!(!s.spanning);
        assert_eq!(s.max_fraction(), 0.0);
    }

    #[test]
    fn ranking_breaks_ties_by_lower_id() {
        let ids = Grid::from_vec(2, 4, vec![7, 7, 3, 3, 0, 9, 9, 9]);
        let s = ClusterStats::summarize(&ids);
        assert_eq!(s.ranking, vec![(9, 3), (3, 2), (7, 2)]);
        assert_eq!(s.max_size, 3);
        assert_eq!(s.occupied_sites(), 7);
        assert_eq!(s.cluster_count(), 3);
        assert_eq!(s.size_of(4), 0);
        assert!((s.fraction_of(3) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn spanning_is_strict() {
        assert!(!is_spanning(8, 16));
        assert!(is_spanning(9, 16));
        assert!(!is_spanning(7, 15));
        assert!(is_spanning(8, 15));
        assert!(is_spanning(1, 1));
        assert!(!is_spanning(0, 1));
    }
}
