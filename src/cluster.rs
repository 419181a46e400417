//! Cluster labeling of an occupancy grid.
//!
//! Two labelers produce the same cluster-id grid:
//!
//! - [`label_relaxation`]: brute-force min-label propagation. Every occupied site
//!   starts with its own id in scan order and repeatedly takes the minimum over
//!   its five-site stencil until a full pass changes nothing. Cost is
//!   O(passes x sites), and the pass count grows with the longest path inside a
//!   cluster, which near the threshold can be much longer than `max(nx, ny)`.
//! - [`label_union_find`]: disjoint-set merge with union by size and path
//!   halving, near-linear in the number of sites. Ids are canonicalized to
//!   the minimum scan-order id of each cluster, so both labelers agree exactly.
//!
//! Unoccupied sites end up with id 0.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::topology::NeighborTopology;

/// Cluster-id grid plus the number of passes the labeler made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labeling {
    pub ids: Grid<u32>,
    pub passes: usize,
}

/// Which labeling algorithm an engine runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Labeler {
    #[default]
    Relaxation,
    UnionFind,
}

impl Labeler {
    pub fn label(self, occupancy: &Grid<bool>, topology: &NeighborTopology) -> Labeling {
        match self {
            Labeler::Relaxation => label_relaxation(occupancy, topology),
            Labeler::UnionFind => label_union_find(occupancy, topology),
        }
    }
}

/// Id held by unoccupied sites during relaxation: larger than any real id.
#[inline]
pub fn empty_sentinel(num_sites: usize) -> u32 {
    (num_sites + 1) as u32
}

pub fn label_relaxation(occupancy: &Grid<bool>, topology: &NeighborTopology) -> Labeling {
    debug_assert_eq!(occupancy.shape(), topology.shape());
    let n = occupancy.len();
    let empty = empty_sentinel(n);

    let mut ids = Grid::filled(occupancy.nx, occupancy.ny, empty);
    let mut next = 1u32;
    for (id, &occupied) in ids.data.iter_mut().zip(&occupancy.data) {
        if occupied {
            *id = next;
            next += 1;
        }
    }

    let mut passes = 0usize;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        debug_assert!(passes <= n + 1, "relaxation failed to converge");

        for s in 0..n {
            let cur = ids.data[s];
            if cur == empty {
                continue;
            }
            // Empty neighbors hold the sentinel and never win the minimum.
            let min = topology
                .neighbors(s)
                .iter()
                .map(|&k| ids.data[k])
                .min()
                .unwrap_or(cur);
            if min != cur {
                ids.data[s] = min;
                changed = true;
            }
        }
    }

    for id in &mut ids.data {
        if *id == empty {
            *id = 0;
        }
    }

    Labeling { ids, passes }
}

pub fn label_union_find(occupancy: &Grid<bool>, topology: &NeighborTopology) -> Labeling {
    debug_assert_eq!(occupancy.shape(), topology.shape());
    let n = occupancy.len();
    let mut forest = SiteForest::new(n);

    for s in (0..n).filter(|&s| occupancy.data[s]) {
        for k in topology.neighbors(s) {
            if k != s && occupancy.data[k] {
                forest.join(s as u32, k as u32);
            }
        }
    }

    // The first member met in scan order carries the cluster's smallest initial id.
    let mut root_id = vec![0u32; n];
    let mut ids = Grid::<u32>::new(occupancy.nx, occupancy.ny);
    let mut next = 1u32;
    for s in 0..n {
        if !occupancy.data[s] {
            continue;
        }
        let root = forest.root(s as u32) as usize;
        if root_id[root] == 0 {
            root_id[root] = next;
        }
        ids.data[s] = root_id[root];
        next += 1;
    }

    Labeling { ids, passes: 1 }
}

/// Site-indexed disjoint-set forest. Site counts are bounded by the `u32` id range.
#[derive(Clone, Debug)]
struct SiteForest {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl SiteForest {
    fn new(num_sites: usize) -> Self {
        Self {
            parent: (0..num_sites as u32).collect(),
            size: vec![1; num_sites],
        }
    }

    /// Root of `site`, halving the path on the way up.
    fn root(&mut self, mut site: u32) -> u32 {
        while self.parent[site as usize] != site {
            let grand = self.parent[self.parent[site as usize] as usize];
            self.parent[site as usize] = grand;
            site = grand;
        }
        site
    }

    /// Merge the trees holding `a` and `b`, hanging the smaller under the larger.
    fn join(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra as usize] >= self.size[rb as usize] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }
}
