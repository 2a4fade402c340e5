//! World chunks.
//!
//! A chunk is an immutable rectangular slice of the composed world grid,
//! addressed by its origin in world-grid units. Chunks align to (0, 0) on
//! a fixed edge length; chunks on the right and bottom world edges are
//! smaller when the dimensions don't divide evenly. A changed world means
//! regenerating and overwriting chunks wholesale, never patching in place.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::world::WorldCell;

/// One persisted slice of the world grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// World-grid x of the top-left cell (multiple of the chunk edge)
    pub origin_x: usize,
    /// World-grid y of the top-left cell (multiple of the chunk edge)
    pub origin_y: usize,
    /// Cells across (the chunk edge, except at the world's right edge)
    pub width: usize,
    /// Cells down (the chunk edge, except at the world's bottom edge)
    pub height: usize,
    /// Row-major cell records
    cells: Vec<WorldCell>,
}

impl Chunk {
    /// Slice one chunk out of a composed grid.
    ///
    /// The origin must be chunk-aligned and inside the grid; the slice is
    /// clipped to the grid's right and bottom edges.
    pub fn from_grid(grid: &Grid<WorldCell>, origin_x: usize, origin_y: usize, edge: usize) -> Self {
        assert!(edge > 0, "chunk edge must be positive");
        assert!(
            origin_x % edge == 0 && origin_y % edge == 0,
            "chunk origin must be aligned"
        );
        assert!(origin_x < grid.width && origin_y < grid.height);

        let width = edge.min(grid.width - origin_x);
        let height = edge.min(grid.height - origin_y);
        let cells = grid.crop(origin_x, origin_y, width, height).into_vec();

        Self {
            origin_x,
            origin_y,
            width,
            height,
            cells,
        }
    }

    /// Cell at chunk-local coordinates.
    pub fn get(&self, local_x: usize, local_y: usize) -> WorldCell {
        debug_assert!(local_x < self.width && local_y < self.height);
        self.cells[local_y * self.width + local_x]
    }

    pub fn cells(&self) -> &[WorldCell] {
        &self.cells
    }
}

/// Origin of the chunk owning world coordinate (x, y).
pub fn origin_of(x: usize, y: usize, edge: usize) -> (usize, usize) {
    (x / edge * edge, y / edge * edge)
}

/// All chunk origins covering a width x height world, row-major.
pub fn chunk_origins(width: usize, height: usize, edge: usize) -> Vec<(usize, usize)> {
    let mut origins = Vec::new();
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            origins.push((x, y));
            x += edge;
        }
        y += edge;
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::LAYERS;

    fn numbered_grid(width: usize, height: usize) -> Grid<WorldCell> {
        let mut grid = Grid::new_with(width, height, [0u16; LAYERS]);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, [(y * width + x) as u16; LAYERS]);
            }
        }
        grid
    }

    #[test]
    fn test_slice_preserves_cells() {
        let grid = numbered_grid(10, 8);
        let chunk = Chunk::from_grid(&grid, 4, 4, 4);

        assert_eq!(chunk.width, 4);
        assert_eq!(chunk.height, 4);
        assert_eq!(chunk.get(0, 0), *grid.get(4, 4));
        assert_eq!(chunk.get(3, 3), *grid.get(7, 7));
    }

    #[test]
    fn test_edge_chunks_are_clipped() {
        let grid = numbered_grid(10, 7);
        let chunk = Chunk::from_grid(&grid, 8, 4, 4);

        assert_eq!(chunk.width, 2);
        assert_eq!(chunk.height, 3);
        assert_eq!(chunk.get(1, 2), *grid.get(9, 6));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of(0, 0, 16), (0, 0));
        assert_eq!(origin_of(15, 16, 16), (0, 16));
        assert_eq!(origin_of(33, 47, 16), (32, 32));
    }

    #[test]
    fn test_chunk_origins_cover_grid() {
        let origins = chunk_origins(10, 7, 4);
        assert_eq!(
            origins,
            vec![(0, 0), (4, 0), (8, 0), (0, 4), (4, 4), (8, 4)]
        );
    }
}
