/// A dense 2D grid addressed as (x, y) = (column, row), stored row-major.
///
/// The world is a bounded rectangle: no axis wraps, and out-of-range
/// access is a caller bug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid from an already-filled row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "buffer does not match dimensions");
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "grid access out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Copy the rectangle with top-left (x0, y0) and the given dimensions
    /// into a new grid. The rectangle must lie fully inside this grid.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        assert!(x0 + width <= self.width && y0 + height <= self.height);
        let mut data = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let row_start = y * self.width + x0;
            data.extend_from_slice(&self.data[row_start..row_start + width]);
        }
        Self { width, height, data }
    }

    /// Copy `src` into this grid with its top-left at (x0, y0).
    pub fn blit(&mut self, src: &Grid<T>, x0: usize, y0: usize) {
        assert!(x0 + src.width <= self.width && y0 + src.height <= self.height);
        for y in 0..src.height {
            let dst_start = (y0 + y) * self.width + x0;
            let src_start = y * src.width;
            self.data[dst_start..dst_start + src.width]
                .clone_from_slice(&src.data[src_start..src_start + src.width]);
        }
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Rows as contiguous slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.width)
    }

    /// Mutable rows, for filling the grid in parallel.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        self.data.chunks_exact_mut(self.width)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}
