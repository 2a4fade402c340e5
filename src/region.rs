//! Viewport queries over the chunk store.
//!
//! A region query answers "give me the world in this rectangle" by loading
//! only the chunks the rectangle overlaps and reassembling their cells.
//! The composed world is never recomputed; a coordinate whose chunk was
//! never generated is an error, not an empty cell.

use crate::cache::ChunkCache;
use crate::chunk::Chunk;
use crate::grid::Grid;
use crate::storage::{BlobStore, ChunkStore, ChunkStoreError};
use crate::world::{Layer, WorldCell};

/// Read-only viewport access to a persisted world.
pub struct RegionQuery<'a, S: BlobStore> {
    store: &'a ChunkStore<S>,
    world_width: usize,
    world_height: usize,
    chunk_size: usize,
}

impl<'a, S: BlobStore> RegionQuery<'a, S> {
    pub fn new(
        store: &'a ChunkStore<S>,
        world_width: usize,
        world_height: usize,
        chunk_size: usize,
    ) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            store,
            world_width,
            world_height,
            chunk_size,
        }
    }

    /// Cells in the box `[x-radius, x+radius) x [y-radius, y+radius)`,
    /// clipped to world bounds. Each overlapped chunk is loaded once.
    pub fn get_region(
        &self,
        x: usize,
        y: usize,
        radius: usize,
    ) -> Result<Grid<WorldCell>, ChunkStoreError> {
        self.assemble(x, y, radius, |origin| self.store.get_chunk(origin))
    }

    /// Like [`get_region`](Self::get_region), but reads through an LRU
    /// cache so hot chunks skip the store entirely.
    pub fn get_region_cached(
        &self,
        cache: &mut ChunkCache,
        x: usize,
        y: usize,
        radius: usize,
    ) -> Result<Grid<WorldCell>, ChunkStoreError> {
        self.assemble(x, y, radius, |origin| cache.fetch(self.store, origin))
    }

    /// One layer of the region: resource ids for a stage, or terrain ids.
    pub fn get_region_layer(
        &self,
        x: usize,
        y: usize,
        radius: usize,
        layer: Layer,
    ) -> Result<Grid<u16>, ChunkStoreError> {
        let cells = self.get_region(x, y, radius)?;
        let idx = layer.index();
        let data = cells.as_slice().iter().map(|cell| cell[idx]).collect();
        Ok(Grid::from_vec(cells.width, cells.height, data))
    }

    fn assemble<F>(
        &self,
        x: usize,
        y: usize,
        radius: usize,
        mut load: F,
    ) -> Result<Grid<WorldCell>, ChunkStoreError>
    where
        F: FnMut((usize, usize)) -> Result<Chunk, ChunkStoreError>,
    {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.world_width);
        let y1 = (y + radius).min(self.world_height);

        if x0 >= x1 || y0 >= y1 {
            return Ok(Grid::new_with(0, 0, [0u16; crate::world::LAYERS]));
        }

        let mut out = Grid::new_with(x1 - x0, y1 - y0, [0u16; crate::world::LAYERS]);

        // Walk the distinct chunk origins the box overlaps and copy each
        // chunk's intersection into the output.
        let edge = self.chunk_size;
        let mut oy = y0 / edge * edge;
        while oy < y1 {
            let mut ox = x0 / edge * edge;
            while ox < x1 {
                let chunk = load((ox, oy))?;

                let copy_x0 = x0.max(ox);
                let copy_y0 = y0.max(oy);
                let copy_x1 = x1.min(ox + chunk.width);
                let copy_y1 = y1.min(oy + chunk.height);

                for wy in copy_y0..copy_y1 {
                    for wx in copy_x0..copy_x1 {
                        out.set(wx - x0, wy - y0, chunk.get(wx - ox, wy - oy));
                    }
                }

                ox += edge;
            }
            oy += edge;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ResourceRegistry, TerrainRegistry};
    use crate::seeds::WorldSeeds;
    use crate::storage::MemBlobStore;
    use crate::world::{World, WorldConfig};

    fn stored_world(seed: u64) -> (World, ChunkStore<MemBlobStore>) {
        let mut config = WorldConfig::new(50, 40, 4.0);
        // Small chunks so queries straddle several of them.
        config.chunk_size = 16;
        let world = World::generate(
            config,
            ResourceRegistry::standard(),
            TerrainRegistry::overworld(),
            WorldSeeds::from_master(seed),
        )
        .unwrap();

        let store = ChunkStore::new(MemBlobStore::new());
        store.write_all(&world.compose(), world.config().chunk_size).unwrap();
        (world, store)
    }

    #[test]
    fn test_region_matches_direct_composition() {
        let (world, store) = stored_world(42);
        let config = *world.config();
        let query = RegionQuery::new(&store, config.width, config.height, config.chunk_size);

        // A viewport straddling chunk boundaries.
        let region = query.get_region(20, 15, 9).unwrap();
        assert_eq!(region.width, 18);
        assert_eq!(region.height, 18);

        for ry in 0..region.height {
            for rx in 0..region.width {
                let wx = 20 - 9 + rx;
                let wy = 15 - 9 + ry;
                assert_eq!(
                    *region.get(rx, ry),
                    world.cell(wx, wy),
                    "mismatch at world ({}, {})",
                    wx,
                    wy
                );
            }
        }
    }

    #[test]
    fn test_region_clips_to_world_bounds() {
        let (world, store) = stored_world(7);
        let config = *world.config();
        let query = RegionQuery::new(&store, config.width, config.height, config.chunk_size);

        // Near the top-left corner: the box sticks out past (0, 0).
        let region = query.get_region(2, 3, 5).unwrap();
        assert_eq!(region.width, 7); // [0, 7)
        assert_eq!(region.height, 8); // [0, 8)
        assert_eq!(*region.get(0, 0), world.cell(0, 0));

        // Near the bottom-right corner.
        let region = query.get_region(48, 38, 5).unwrap();
        assert_eq!(region.width, 7); // [43, 50)
        assert_eq!(region.height, 7); // [33, 40)
        assert_eq!(
            *region.get(region.width - 1, region.height - 1),
            world.cell(49, 39)
        );
    }

    #[test]
    fn test_region_layer_selects_one_plane() {
        let (world, store) = stored_world(9);
        let config = *world.config();
        let query = RegionQuery::new(&store, config.width, config.height, config.chunk_size);

        let terrain = query.get_region_layer(25, 20, 6, Layer::Terrain).unwrap();
        let full = query.get_region(25, 20, 6).unwrap();

        assert_eq!(terrain.width, full.width);
        for (x, y, cell) in full.iter() {
            assert_eq!(*terrain.get(x, y), cell[Layer::Terrain.index()]);
        }
    }

    #[test]
    fn test_missing_chunk_fails_not_defaults() {
        // A store with no generated chunks at all.
        let store: ChunkStore<MemBlobStore> = ChunkStore::new(MemBlobStore::new());
        let query = RegionQuery::new(&store, 100, 100, 16);

        assert!(matches!(
            query.get_region(10, 10, 5),
            Err(ChunkStoreError::ChunkNotFound { .. })
        ));
    }

    #[test]
    fn test_partial_store_fails_for_uncovered_region() {
        let (world, store) = stored_world(5);
        let config = *world.config();

        // Rebuild a store holding only the (0, 0) chunk.
        let partial = ChunkStore::new(MemBlobStore::new());
        partial.put_chunk(&store.get_chunk((0, 0)).unwrap()).unwrap();

        let query = RegionQuery::new(&partial, config.width, config.height, config.chunk_size);

        // Inside the stored chunk: fine.
        assert!(query.get_region(5, 5, 3).is_ok());

        // Overlapping a missing chunk: error, never zeros.
        assert!(matches!(
            query.get_region(config.chunk_size, 5, 3),
            Err(ChunkStoreError::ChunkNotFound { .. })
        ));
    }

    #[test]
    fn test_cached_region_matches_uncached() {
        let (world, store) = stored_world(13);
        let config = *world.config();
        let query = RegionQuery::new(&store, config.width, config.height, config.chunk_size);
        let mut cache = ChunkCache::with_size(8);

        let direct = query.get_region(25, 20, 10).unwrap();
        let cached = query.get_region_cached(&mut cache, 25, 20, 10).unwrap();
        assert_eq!(direct, cached);

        // Second query over the same area is served from cache.
        let miss_count = cache.stats().misses;
        let again = query.get_region_cached(&mut cache, 25, 20, 10).unwrap();
        assert_eq!(direct, again);
        assert_eq!(cache.stats().misses, miss_count);
    }
}
