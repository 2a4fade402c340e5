//! Chunk persistence.
//!
//! Chunks are stored as one addressable blob each, keyed canonically by
//! their world-grid origin. The backing store is a small key-value
//! interface so the filesystem can be swapped for an object store or an
//! embedded KV without touching the chunk logic.
//!
//! A missing chunk is always an error on read; the store never recomputes
//! or substitutes empty cells.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rayon::prelude::*;

use crate::chunk::{chunk_origins, Chunk};
use crate::grid::Grid;
use crate::world::WorldCell;

/// Key-value blob storage for chunk records.
///
/// `put` must be atomic from a reader's perspective: a concurrent `get`
/// observes either the previous blob or the complete new one, never a
/// partial write.
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ChunkStoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ChunkStoreError>;
    fn keys(&self) -> Result<Vec<String>, ChunkStoreError>;
}

/// Filesystem-backed blob store.
///
/// Blobs live in a directory organized by world seed:
/// `{base_dir}/world_{seed}/{key}.bin`. Writes go to a temporary file in
/// the same directory and are published with a rename.
pub struct FsBlobStore {
    base_dir: PathBuf,
    world_seed: u64,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(base_dir: P, world_seed: u64) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            world_seed,
        }
    }

    fn world_dir(&self) -> PathBuf {
        self.base_dir.join(format!("world_{}", self.world_seed))
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.world_dir().join(format!("{}.bin", key))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ChunkStoreError> {
        fs::create_dir_all(self.world_dir())?;

        let path = self.blob_path(key);
        let tmp_path = self.world_dir().join(format!("{}.tmp", key));

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ChunkStoreError> {
        let path = self.blob_path(key);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    fn keys(&self) -> Result<Vec<String>, ChunkStoreError> {
        let dir = self.world_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

/// In-memory blob store, for tests and ephemeral worlds.
#[derive(Default)]
pub struct MemBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ChunkStoreError> {
        self.blobs
            .write()
            .expect("blob lock poisoned")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ChunkStoreError> {
        Ok(self
            .blobs
            .read()
            .expect("blob lock poisoned")
            .get(key)
            .cloned())
    }

    fn keys(&self) -> Result<Vec<String>, ChunkStoreError> {
        Ok(self
            .blobs
            .read()
            .expect("blob lock poisoned")
            .keys()
            .cloned()
            .collect())
    }
}

/// Chunk store over a blob backend: canonical keys, bincode encoding, and
/// whole-grid persistence.
pub struct ChunkStore<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> ChunkStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Canonical blob key for a chunk origin.
    pub fn key_for(origin: (usize, usize)) -> String {
        format!("chunk_{}_{}", origin.0, origin.1)
    }

    /// Persist one chunk.
    pub fn put_chunk(&self, chunk: &Chunk) -> Result<(), ChunkStoreError> {
        let bytes = bincode::serialize(chunk)
            .map_err(|e| ChunkStoreError::Serialization(e.to_string()))?;
        self.store
            .put(&Self::key_for((chunk.origin_x, chunk.origin_y)), &bytes)
    }

    /// Load one chunk by origin.
    ///
    /// A missing blob is `ChunkNotFound`; a blob that fails to decode, or
    /// decodes to a different origin than its key, is `ChunkCorrupt`.
    pub fn get_chunk(&self, origin: (usize, usize)) -> Result<Chunk, ChunkStoreError> {
        let bytes = self
            .store
            .get(&Self::key_for(origin))?
            .ok_or(ChunkStoreError::ChunkNotFound {
                x: origin.0,
                y: origin.1,
            })?;

        let chunk: Chunk = bincode::deserialize(&bytes).map_err(|e| {
            ChunkStoreError::ChunkCorrupt {
                x: origin.0,
                y: origin.1,
                detail: e.to_string(),
            }
        })?;

        if (chunk.origin_x, chunk.origin_y) != origin {
            return Err(ChunkStoreError::ChunkCorrupt {
                x: origin.0,
                y: origin.1,
                detail: format!(
                    "blob decodes to origin ({}, {})",
                    chunk.origin_x, chunk.origin_y
                ),
            });
        }
        if chunk.cells().len() != chunk.width * chunk.height {
            return Err(ChunkStoreError::ChunkCorrupt {
                x: origin.0,
                y: origin.1,
                detail: format!(
                    "{} cells for a {}x{} chunk",
                    chunk.cells().len(),
                    chunk.width,
                    chunk.height
                ),
            });
        }

        Ok(chunk)
    }

    /// Slice a composed grid into (0, 0)-aligned chunks and persist each
    /// one. Chunk origins partition the grid, so writes are independent
    /// and run in parallel. Returns the number of chunks written.
    pub fn write_all(&self, grid: &Grid<WorldCell>, edge: usize) -> Result<usize, ChunkStoreError> {
        assert!(edge > 0, "chunk edge must be positive");

        let origins = chunk_origins(grid.width, grid.height, edge);
        origins
            .par_iter()
            .try_for_each(|&(x, y)| self.put_chunk(&Chunk::from_grid(grid, x, y, edge)))?;

        Ok(origins.len())
    }

    /// Origins of every persisted chunk, in no particular order.
    pub fn list_origins(&self) -> Result<Vec<(usize, usize)>, ChunkStoreError> {
        let mut origins = Vec::new();
        for key in self.store.keys()? {
            // Keys follow "chunk_{x}_{y}"; anything else in the store is
            // not ours and is skipped.
            if let Some(rest) = key.strip_prefix("chunk_") {
                let parts: Vec<&str> = rest.split('_').collect();
                if parts.len() == 2 {
                    if let (Ok(x), Ok(y)) = (parts[0].parse(), parts[1].parse()) {
                        origins.push((x, y));
                    }
                }
            }
        }
        Ok(origins)
    }
}

/// Errors from chunk storage operations.
#[derive(Debug)]
pub enum ChunkStoreError {
    /// No chunk was ever stored at this origin
    ChunkNotFound { x: usize, y: usize },
    /// The stored blob fails to decode (truncated file, version mismatch)
    ChunkCorrupt { x: usize, y: usize, detail: String },
    /// IO error (permissions, disk full, etc.)
    Io(std::io::Error),
    /// Chunk failed to encode
    Serialization(String),
}

impl std::fmt::Display for ChunkStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkStoreError::ChunkNotFound { x, y } => {
                write!(f, "no chunk stored at origin ({}, {})", x, y)
            }
            ChunkStoreError::ChunkCorrupt { x, y, detail } => {
                write!(f, "chunk at origin ({}, {}) is corrupt: {}", x, y, detail)
            }
            ChunkStoreError::Io(e) => write!(f, "IO error: {}", e),
            ChunkStoreError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for ChunkStoreError {}

impl From<std::io::Error> for ChunkStoreError {
    fn from(e: std::io::Error) -> Self {
        ChunkStoreError::Io(e)
    }
}
