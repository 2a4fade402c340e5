//! Seed management for world generation
//!
//! Provides separate seeds for each generation system, allowing fine-grained
//! control over which aspects of the world to vary or keep constant.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for all world generation systems.
///
/// Each system gets its own seed, derived from a master seed by default.
/// Individual seeds can be overridden for experimentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Blue-noise sample generation (deposit positions)
    pub samples: u64,
    /// Per-stage resource assignment
    pub resources: u64,
    /// Terrain noise field
    pub terrain: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            samples: derive_seed(master, "samples"),
            resources: derive_seed(master, "resources"),
            terrain: derive_seed(master, "terrain"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    /// Override the sample generation seed
    pub fn samples(mut self, seed: u64) -> Self {
        self.seeds.samples = seed;
        self
    }

    /// Override the resource assignment seed
    pub fn resources(mut self, seed: u64) -> Self {
        self.seeds.resources = seed;
        self
    }

    /// Override the terrain field seed
    pub fn terrain(mut self, seed: u64) -> Self {
        self.seeds.terrain = seed;
        self
    }

    /// Build the final WorldSeeds
    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a system name.
/// Uses hashing to ensure different systems get different but deterministic seeds.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, samples: {}, resources: {}, terrain: {} }}",
            self.master, self.samples, self.resources, self.terrain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = WorldSeeds::from_master(12345);
        let seeds2 = WorldSeeds::from_master(12345);

        assert_eq!(seeds1, seeds2);
    }

    #[test]
    fn test_different_systems_get_different_seeds() {
        let seeds = WorldSeeds::from_master(12345);

        assert_ne!(seeds.samples, seeds.resources);
        assert_ne!(seeds.resources, seeds.terrain);
        assert_ne!(seeds.samples, seeds.terrain);
    }

    #[test]
    fn test_builder_override() {
        let seeds = WorldSeeds::builder(12345).terrain(99999).build();

        assert_eq!(seeds.terrain, 99999);

        // Others should still be derived from master
        let default_seeds = WorldSeeds::from_master(12345);
        assert_eq!(seeds.samples, default_seeds.samples);
        assert_eq!(seeds.resources, default_seeds.resources);
    }
}
