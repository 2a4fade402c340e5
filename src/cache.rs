//! LRU chunk cache.
//!
//! Keeps recently used decoded chunks in memory so repeated viewport
//! queries don't re-read and re-decode blobs. Read-through: a miss falls
//! back to the chunk store and the loaded chunk is cached.

use std::collections::{HashMap, VecDeque};

use crate::chunk::Chunk;
use crate::storage::{BlobStore, ChunkStore, ChunkStoreError};

/// Default number of cached chunks.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of evictions
    pub evictions: usize,
    /// Current number of cached chunks
    pub chunk_count: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Hits: {} | Misses: {} | Rate: {:.1}% | Chunks: {}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.chunk_count,
        )
    }
}

/// LRU cache over decoded chunks, keyed by origin.
pub struct ChunkCache {
    chunks: HashMap<(usize, usize), Chunk>,
    /// LRU order (most recent at back)
    lru_order: VecDeque<(usize, usize)>,
    max_size: usize,
    stats: CacheStats,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_CACHE_SIZE)
    }

    pub fn with_size(max_size: usize) -> Self {
        assert!(max_size > 0, "cache must hold at least one chunk");
        Self {
            chunks: HashMap::with_capacity(max_size),
            lru_order: VecDeque::with_capacity(max_size),
            max_size,
            stats: CacheStats::default(),
        }
    }

    /// Get a cached chunk, refreshing its LRU position.
    pub fn get(&mut self, origin: (usize, usize)) -> Option<&Chunk> {
        if self.chunks.contains_key(&origin) {
            self.touch(origin);
            self.stats.hits += 1;
            self.chunks.get(&origin)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Insert a chunk, evicting the least recently used one if full.
    pub fn insert(&mut self, chunk: Chunk) {
        let key = (chunk.origin_x, chunk.origin_y);

        if self.chunks.len() >= self.max_size && !self.chunks.contains_key(&key) {
            if let Some(old_key) = self.lru_order.pop_front() {
                self.chunks.remove(&old_key);
                self.stats.evictions += 1;
            }
        }

        self.touch(key);
        self.chunks.insert(key, chunk);
        self.stats.chunk_count = self.chunks.len();
    }

    /// Cached chunk if present, otherwise loaded from the store and
    /// cached. Returns an owned copy so callers can assemble regions
    /// while continuing to fetch.
    pub fn fetch<S: BlobStore>(
        &mut self,
        store: &ChunkStore<S>,
        origin: (usize, usize),
    ) -> Result<Chunk, ChunkStoreError> {
        if let Some(chunk) = self.get(origin) {
            return Ok(chunk.clone());
        }

        let chunk = store.get_chunk(origin)?;
        self.insert(chunk.clone());
        Ok(chunk)
    }

    pub fn contains(&self, origin: (usize, usize)) -> bool {
        self.chunks.contains_key(&origin)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.lru_order.clear();
        self.stats = CacheStats::default();
    }

    fn touch(&mut self, key: (usize, usize)) {
        self.lru_order.retain(|k| *k != key);
        self.lru_order.push_back(key);
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new()
    }
}
