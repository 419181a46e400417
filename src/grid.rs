/// Row-major flat lattice grid. No per-site objects.
/// Site (i, j) lives at `i * ny + j`, with `i < nx` and `j < ny`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub nx: usize,
    pub ny: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(nx: usize, ny: usize) -> Self {
        Self::filled(nx, ny, T::default())
    }

    pub fn filled(nx: usize, ny: usize, v: T) -> Self {
        Self {
            data: vec![v; nx * ny],
            nx,
            ny,
        }
    }

    /// Wrap an existing row-major buffer. Panics if the length does not match the shape.
    pub fn from_vec(nx: usize, ny: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), nx * ny, "buffer length does not match {nx}x{ny}");
        Self { data, nx, ny }
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i * self.ny + j
    }

    /// Inverse of [`Grid::idx`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.ny, idx % self.ny)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.idx(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: T) {
        let k = self.idx(i, j);
        self.data[k] = v;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

impl Grid<bool> {
    /// Number of occupied sites.
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let mut g = Grid::<u32>::new(3, 4);
        g.set(2, 1, 7);
        assert_eq!(g.idx(2, 1), 9);
        assert_eq!(g.data[9], 7);
        assert_eq!(g.coords(9), (2, 1));
        assert_eq!(g.shape(), (3, 4));
    }

    #[test]
    fn count_true_counts_occupied() {
        let g = Grid::from_vec(2, 2, vec![true, false, true, true]);
        assert_eq!(g.count_true(), 3);
    }
}
