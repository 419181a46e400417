use serde::{Deserialize, Serialize};

use crate::config::validate_shape;
use crate::error::ConfigError;

/// Neighbor order within a site's stencil.
pub const LEFT: usize = 0;
pub const CENTER: usize = 1;
pub const RIGHT: usize = 2;
pub const DOWN: usize = 3;
pub const UP: usize = 4;

/// Edge handling for the lattice.
///
/// A non-wrapping axis maps the missing neighbor onto the site itself, so every
/// stencil keeps exactly five valid entries and never gains a false connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Both axes wrap (torus).
    #[default]
    Periodic,
    /// The `i` axis wraps, the `j` axis stops at the edges.
    Cylindrical,
    /// Neither axis wraps.
    Clamped,
}

impl Boundary {
    #[inline]
    fn wraps_i(self) -> bool {
        matches!(self, Boundary::Periodic | Boundary::Cylindrical)
    }

    #[inline]
    fn wraps_j(self) -> bool {
        matches!(self, Boundary::Periodic)
    }
}

/// Step `k` by `delta` (±1) on an axis of length `n`.
#[inline]
fn step(k: usize, delta: isize, n: usize, wrap: bool) -> usize {
    let moved = k as isize + delta;
    if (0..n as isize).contains(&moved) {
        moved as usize
    } else if wrap {
        moved.rem_euclid(n as isize) as usize
    } else {
        k
    }
}

/// Precomputed `[left, self, right, down, up]` stencil of linear indices for
/// every site of an `nx`-by-`ny` lattice. Immutable once built; rebuild on any
/// shape or boundary change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborTopology {
    nx: usize,
    ny: usize,
    boundary: Boundary,
    stencils: Vec<[usize; 5]>,
}

impl NeighborTopology {
    pub fn build(nx: usize, ny: usize, boundary: Boundary) -> Result<Self, ConfigError> {
        validate_shape(nx, ny)?;
        Ok(Self::build_validated(nx, ny, boundary))
    }

    /// Build for a shape already checked by [`validate_shape`].
    pub(crate) fn build_validated(nx: usize, ny: usize, boundary: Boundary) -> Self {
        let (wi, wj) = (boundary.wraps_i(), boundary.wraps_j());

        let mut stencils = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let left = step(i, -1, nx, wi);
                let right = step(i, 1, nx, wi);
                let down = step(j, -1, ny, wj);
                let up = step(j, 1, ny, wj);
                stencils.push([
                    left * ny + j,
                    i * ny + j,
                    right * ny + j,
                    i * ny + down,
                    i * ny + up,
                ]);
            }
        }

        Self {
            nx,
            ny,
            boundary,
            stencils,
        }
    }

    /// Periodic (toroidal) topology.
    pub fn periodic(nx: usize, ny: usize) -> Result<Self, ConfigError> {
        Self::build(nx, ny, Boundary::Periodic)
    }

    #[inline]
    pub fn neighbors(&self, idx: usize) -> [usize; 5] {
        self.stencils[idx]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn num_sites(&self) -> usize {
        self.stencils.len()
    }

    /// True if this topology can serve a lattice of the given shape and boundary.
    pub fn matches(&self, nx: usize, ny: usize, boundary: Boundary) -> bool {
        self.nx == nx && self.ny == ny && self.boundary == boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interior_site_stencil() {
        let t = NeighborTopology::periodic(5, 5).unwrap();
        // (2, 2) -> 12
        assert_eq!(t.neighbors(12), [7, 12, 17, 11, 13]);
    }

    #[test]
    fn periodic_corner_wraps_both_axes() {
        let t = NeighborTopology::periodic(4, 3).unwrap();
        let n = t.neighbors(0);
        assert_eq!(n[LEFT], 3 * 3);
        assert_eq!(n[CENTER], 0);
        assert_eq!(n[RIGHT], 3);
        assert_eq!(n[DOWN], 2);
        assert_eq!(n[UP], 1);
    }

    #[test]
    fn cylindrical_wraps_only_i() {
        let t = NeighborTopology::build(4, 3, Boundary::Cylindrical).unwrap();
        let n = t.neighbors(0);
        assert_eq!(n[LEFT], 9);
        assert_eq!(n[DOWN], 0);
        assert_eq!(n[UP], 1);
    }

    #[test]
    fn clamped_collapses_onto_self() {
        let t = NeighborTopology::build(3, 3, Boundary::Clamped).unwrap();
        assert_eq!(t.neighbors(0), [0, 0, 3, 0, 1]);
        assert_eq!(t.neighbors(8), [5, 8, 8, 7, 8]);
    }

    #[test]
    fn single_site_lattice_points_at_itself() {
        let t = NeighborTopology::periodic(1, 1).unwrap();
        assert_eq!(t.neighbors(0), [0; 5]);
    }

    #[test]
    fn rejects_empty_shape() {
        assert!(NeighborTopology::periodic(0, 4).is_err());
    }

    fn arb_boundary() -> impl Strategy<Value = Boundary> {
        prop_oneof![
            Just(Boundary::Periodic),
            Just(Boundary::Cylindrical),
            Just(Boundary::Clamped),
        ]
    }

    proptest! {
        #[test]
        fn stencils_are_valid_and_symmetric(
            nx in 1usize..12,
            ny in 1usize..12,
            boundary in arb_boundary(),
        ) {
            let t = NeighborTopology::build(nx, ny, boundary).unwrap();
            prop_assert_eq!(t.num_sites(), nx * ny);
            for s in 0..nx * ny {
                let n = t.neighbors(s);
                prop_assert_eq!(n[CENTER], s);
                for &k in &n {
                    prop_assert!(k < nx * ny);
                    // adjacency is symmetric
                    prop_assert!(t.neighbors(k).contains(&s));
                }
            }
        }
    }
}
