//! World aggregate and compositor.
//!
//! Bundles the sample index, resource table, and terrain field behind one
//! struct, and materializes the full per-cell grid in a single pass. Every
//! cell resolves its owning sample through the spatial index, inherits that
//! sample's four stage resources, and gets a terrain band from the noise
//! field.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::registry::{ResourceEntry, ResourceRegistry, TerrainRegistry, STAGES};
use crate::resources::assign_resources;
use crate::samples::{floor_points, poisson_disc_samples, SampleParams};
use crate::seeds::WorldSeeds;
use crate::spatial::SpatialIndex;
use crate::terrain::{TerrainField, TerrainParams};

/// Layers per cell: one resource id per stage, plus the terrain band.
pub const LAYERS: usize = STAGES + 1;

/// One world cell: `[stage0, stage1, stage2, stage3, terrain]`.
pub type WorldCell = [u16; LAYERS];

/// Selects a single layer of the composed world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Stage0,
    Stage1,
    Stage2,
    Stage3,
    Terrain,
}

impl Layer {
    /// Position of this layer inside a [`WorldCell`].
    pub fn index(self) -> usize {
        match self {
            Layer::Stage0 => 0,
            Layer::Stage1 => 1,
            Layer::Stage2 => 2,
            Layer::Stage3 => 3,
            Layer::Terrain => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Layer::Stage0),
            1 => Some(Layer::Stage1),
            2 => Some(Layer::Stage2),
            3 => Some(Layer::Stage3),
            4 => Some(Layer::Terrain),
            _ => None,
        }
    }
}

/// Parameters for a full world.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// World width in grid cells
    pub width: usize,
    /// World height in grid cells
    pub height: usize,
    /// Minimum distance between resource deposits
    pub min_distance: f64,
    /// Poisson disc candidates per active point
    pub attempts: usize,
    /// Chunk edge length for persistence
    pub chunk_size: usize,
    /// Terrain noise parameters
    pub terrain: TerrainParams,
}

impl WorldConfig {
    pub fn new(width: usize, height: usize, min_distance: f64) -> Self {
        Self {
            width,
            height,
            min_distance,
            attempts: 5,
            chunk_size: 64,
            terrain: TerrainParams::default(),
        }
    }

    /// Reject configurations before any generation work happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return Err(ConfigError::InvalidMinDistance(self.min_distance));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        self.terrain.validate()?;
        Ok(())
    }
}

/// Counts and timings from world generation, returned per call instead of
/// accumulating in any shared state.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerationStats {
    /// Number of blue-noise samples generated
    pub sample_count: usize,
    /// Time spent in Poisson disc sampling
    pub samples_ms: u128,
    /// Time spent assigning per-stage resources
    pub assign_ms: u128,
}

impl GenerationStats {
    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Samples: {} ({}ms) | Resource assignment: {}ms",
            self.sample_count, self.samples_ms, self.assign_ms
        )
    }
}

/// A fully generated world: sample geometry, per-stage resources, and the
/// terrain field, ready to compose cells or answer point lookups.
///
/// Lifecycle is generate-once-then-serve; nothing here mutates after
/// construction.
pub struct World {
    seeds: WorldSeeds,
    config: WorldConfig,
    index: SpatialIndex,
    resource_table: Vec<[u16; STAGES]>,
    terrain: TerrainField,
    resources: ResourceRegistry,
    terrain_bands: TerrainRegistry,
    stats: GenerationStats,
}

impl World {
    /// Generate a world from validated configuration and registries.
    ///
    /// Deterministic: the seed set fully determines the sample set, the
    /// resource table, and the terrain field.
    pub fn generate(
        config: WorldConfig,
        resources: ResourceRegistry,
        terrain_bands: TerrainRegistry,
        seeds: WorldSeeds,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let start = Instant::now();
        let params = SampleParams {
            width: config.width,
            height: config.height,
            min_distance: config.min_distance,
            attempts: config.attempts,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seeds.samples);
        let raw = poisson_disc_samples(&params, &mut rng)?;
        // Deposits live on the integer grid; floor matches the original
        // game's truncation.
        let points = floor_points(&raw);
        let samples_ms = start.elapsed().as_millis();

        let index = SpatialIndex::build(points, config.width, config.height, config.min_distance);

        let start = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(seeds.resources);
        let resource_table = assign_resources(index.len(), &resources, &mut rng);
        let assign_ms = start.elapsed().as_millis();

        let terrain = TerrainField::new(seeds.terrain, config.terrain);

        let stats = GenerationStats {
            sample_count: index.len(),
            samples_ms,
            assign_ms,
        };

        Ok(Self {
            seeds,
            config,
            index,
            resource_table,
            terrain,
            resources,
            terrain_bands,
            stats,
        })
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn samples(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn resource_registry(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn terrain_registry(&self) -> &TerrainRegistry {
        &self.terrain_bands
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Resource ids for one sample, indexed by stage.
    pub fn sample_resources(&self, sample: usize) -> [u16; STAGES] {
        self.resource_table[sample]
    }

    /// Compose a single cell. Identical to what [`World::compose`] writes
    /// at the same coordinates.
    pub fn cell(&self, x: usize, y: usize) -> WorldCell {
        debug_assert!(x < self.config.width && y < self.config.height);

        // The sampler always emits at least its seed point.
        let owner = self
            .index
            .nearest(x as f64, y as f64)
            .expect("sample set is never empty");
        let stages = self.resource_table[owner];

        let value = self.terrain.value(x as f64, y as f64);
        let terrain = self.terrain_bands.classify(value);

        [stages[0], stages[1], stages[2], stages[3], terrain]
    }

    /// Materialize the full world grid in one pass, rows in parallel.
    pub fn compose(&self) -> Grid<WorldCell> {
        let mut grid = Grid::new_with(self.config.width, self.config.height, [0u16; LAYERS]);
        let rows: Vec<&mut [WorldCell]> = grid.rows_mut().collect();

        rows.into_par_iter().enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.cell(x, y);
            }
        });

        grid
    }

    /// Resource at the deposit owning this point, for one stage.
    ///
    /// This is the lookup the production layer uses to price a building
    /// site.
    pub fn resource_at(&self, x: f64, y: f64, stage: usize) -> &ResourceEntry {
        assert!(stage < STAGES, "stage {} out of range", stage);
        let owner = self
            .index
            .nearest(x, y)
            .expect("sample set is never empty");
        self.resources.get(self.resource_table[owner][stage])
    }
}
