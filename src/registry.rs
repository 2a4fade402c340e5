//! Resource and terrain registries.
//!
//! Both registries are ordered entry lists: an entry's dense id is its
//! position in the list, stable across runs for a fixed registry. A
//! name-to-id map is built once at load time so callers never scan by name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of game-progression stages. Each resource carries one spawn
/// weight per stage.
pub const STAGES: usize = 4;

/// One resource kind: name, display color, and per-stage spawn weights.
///
/// Weights are relative within a stage; they do not need to sum to 1
/// (sampling normalizes them), but a stage whose weights are all zero is
/// rejected at load time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub color: String,
    pub stages: [f64; STAGES],
}

/// Ordered resource registry with dense ids.
#[derive(Clone, Debug)]
pub struct ResourceRegistry {
    entries: Vec<ResourceEntry>,
    by_name: HashMap<String, u16>,
}

impl ResourceRegistry {
    /// Build a registry from an ordered entry list, validating the weights.
    pub fn new(entries: Vec<ResourceEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyRegistry("resource"));
        }

        for entry in &entries {
            for (stage, &w) in entry.stages.iter().enumerate() {
                if !w.is_finite() || w < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        resource: entry.name.clone(),
                        stage,
                    });
                }
            }
        }

        // A stage nothing can spawn in is a configuration error, not a
        // quiet empty map.
        for stage in 0..STAGES {
            let total: f64 = entries.iter().map(|e| e.stages[stage]).sum();
            if total <= 0.0 {
                return Err(ConfigError::DegenerateStage(stage));
            }
        }

        let by_name = entries
            .iter()
            .enumerate()
            .map(|(id, e)| (e.name.clone(), id as u16))
            .collect();

        Ok(Self { entries, by_name })
    }

    /// Parse a registry from a JSON array of entries (order defines ids).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<ResourceEntry> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::new(entries)
    }

    /// The resource table the original game shipped with.
    pub fn standard() -> Self {
        let entries = vec![
            resource("Stone", "gray", [0.7, 0.15, 0.0, 0.05]),
            resource("Coal", "black", [0.3, 0.25, 0.15, 0.05]),
            resource("Copper", "red", [0.0, 0.3, 0.2, 0.1]),
            resource("Iron", "blue", [0.0, 0.3, 0.2, 0.1]),
            resource("Crude Oil", "brown", [0.0, 0.0, 0.1, 0.1]),
            resource("Silicon", "yellow", [0.0, 0.0, 0.12, 0.2]),
            resource("Limestone", "beige", [0.0, 0.0, 0.18, 0.175]),
            resource("Aluminum", "silver", [0.0, 0.0, 0.05, 0.1]),
            resource("Uranium", "green", [0.0, 0.0, 0.0, 0.025]),
            resource("Gold", "gold", [0.0, 0.0, 0.0, 0.05]),
            resource("Lithium", "purple", [0.0, 0.0, 0.0, 0.05]),
        ];
        Self::new(entries).expect("standard registry is valid")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by dense id.
    pub fn get(&self, id: u16) -> &ResourceEntry {
        &self.entries[id as usize]
    }

    /// Dense id for a name, if present.
    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    /// Raw weight column for one stage, indexed by resource id.
    pub fn stage_weights(&self, stage: usize) -> Vec<f64> {
        self.entries.iter().map(|e| e.stages[stage]).collect()
    }

    /// Weight column normalized to sum to 1.
    pub fn normalized_stage_weights(&self, stage: usize) -> Vec<f64> {
        let weights = self.stage_weights(stage);
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

fn resource(name: &str, color: &str, stages: [f64; STAGES]) -> ResourceEntry {
    ResourceEntry {
        name: name.to_string(),
        color: color.to_string(),
        stages,
    }
}

/// One terrain band: name, display color, and the half-open noise range
/// `[lo, hi)` it claims.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainEntry {
    pub name: String,
    pub color: String,
    pub lo: f64,
    pub hi: f64,
}

/// Ordered terrain registry with dense ids.
///
/// Bands are kept sorted by `lo` and must partition the noise co-domain
/// `[-1, 1]` exactly: the first band starts at -1, each band starts where
/// the previous one ends, and the last band ends at 1.
#[derive(Clone, Debug)]
pub struct TerrainRegistry {
    entries: Vec<TerrainEntry>,
    by_name: HashMap<String, u16>,
}

impl TerrainRegistry {
    /// Build a registry from an ordered entry list, validating the partition.
    pub fn new(entries: Vec<TerrainEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyRegistry("terrain"));
        }

        for entry in &entries {
            if !entry.lo.is_finite() || !entry.hi.is_finite() || entry.lo >= entry.hi {
                return Err(ConfigError::EmptyBand {
                    name: entry.name.clone(),
                });
            }
        }

        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| a.lo.partial_cmp(&b.lo).expect("band bounds are finite"));
        if sorted != entries {
            // Band order defines ids; a registry that isn't sorted by lo
            // would classify correctly but hand out surprising ids.
            return Err(ConfigError::Parse(
                "terrain bands must be listed in ascending order of lo".to_string(),
            ));
        }

        if entries[0].lo != -1.0 || entries[entries.len() - 1].hi != 1.0 {
            return Err(ConfigError::BandCoverage {
                lo: entries[0].lo,
                hi: entries[entries.len() - 1].hi,
            });
        }

        for pair in entries.windows(2) {
            if pair[1].lo > pair[0].hi {
                return Err(ConfigError::BandGap { at: pair[0].hi });
            }
            if pair[1].lo < pair[0].hi {
                return Err(ConfigError::BandOverlap { at: pair[1].lo });
            }
        }

        let by_name = entries
            .iter()
            .enumerate()
            .map(|(id, e)| (e.name.clone(), id as u16))
            .collect();

        Ok(Self { entries, by_name })
    }

    /// Parse a registry from a JSON array of entries (order defines ids).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<TerrainEntry> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::new(entries)
    }

    /// The overworld terrain key the original game shipped with.
    pub fn overworld() -> Self {
        let entries = vec![
            terrain("DeepWater", "darkblue", -1.0, -0.35),
            terrain("Water", "blue", -0.35, -0.25),
            terrain("Sand", "yellow", -0.25, -0.2),
            terrain("Grass", "green", -0.2, 0.15),
            terrain("Forest", "darkgreen", 0.15, 1.0),
        ];
        Self::new(entries).expect("overworld registry is valid")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by dense id.
    pub fn get(&self, id: u16) -> &TerrainEntry {
        &self.entries[id as usize]
    }

    /// Dense id for a name, if present.
    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    pub fn entries(&self) -> &[TerrainEntry] {
        &self.entries
    }

    /// Classify a noise value into a band id.
    ///
    /// Bands are half-open: the first band with `lo <= value < hi` wins, so
    /// a value sitting exactly on a boundary belongs to the upper band.
    /// Values no band claims (NaN, or exactly 1.0, which the half-open top
    /// band excludes) fall back to id 0.
    pub fn classify(&self, value: f64) -> u16 {
        for (id, entry) in self.entries.iter().enumerate() {
            if entry.lo <= value && value < entry.hi {
                return id as u16;
            }
        }
        0
    }
}

fn terrain(name: &str, color: &str, lo: f64, hi: f64) -> TerrainEntry {
    TerrainEntry {
        name: name.to_string(),
        color: color.to_string(),
        lo,
        hi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_ids_are_dense_and_ordered() {
        let registry = ResourceRegistry::standard();
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.id_of("Stone"), Some(0));
        assert_eq!(registry.id_of("Lithium"), Some(10));
        assert_eq!(registry.get(4).name, "Crude Oil");
        assert_eq!(registry.id_of("Mithril"), None);
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let registry = ResourceRegistry::standard();
        for stage in 0..STAGES {
            let total: f64 = registry.normalized_stage_weights(stage).iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "stage {} sums to {}", stage, total);
        }
    }

    #[test]
    fn test_degenerate_stage_rejected() {
        let entries = vec![
            resource("A", "red", [1.0, 0.0, 1.0, 1.0]),
            resource("B", "blue", [1.0, 0.0, 1.0, 1.0]),
        ];
        assert!(matches!(
            ResourceRegistry::new(entries),
            Err(ConfigError::DegenerateStage(1))
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let entries = vec![resource("A", "red", [1.0, -0.5, 1.0, 1.0])];
        assert!(matches!(
            ResourceRegistry::new(entries),
            Err(ConfigError::InvalidWeight { stage: 1, .. })
        ));
    }

    #[test]
    fn test_resource_registry_json_round_trip() {
        let json = r#"[
            {"name": "Stone", "color": "gray", "stages": [0.7, 0.15, 0.0, 0.05]},
            {"name": "Coal", "color": "black", "stages": [0.3, 0.85, 1.0, 0.95]}
        ]"#;
        let registry = ResourceRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.id_of("Coal"), Some(1));
    }

    #[test]
    fn test_overworld_partition_is_valid() {
        let registry = TerrainRegistry::overworld();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.id_of("DeepWater"), Some(0));
        assert_eq!(registry.id_of("Forest"), Some(4));
    }

    #[test]
    fn test_band_gap_rejected() {
        let entries = vec![
            terrain("Low", "blue", -1.0, -0.2),
            terrain("High", "green", 0.0, 1.0),
        ];
        assert!(matches!(
            TerrainRegistry::new(entries),
            Err(ConfigError::BandGap { .. })
        ));
    }

    #[test]
    fn test_band_overlap_rejected() {
        let entries = vec![
            terrain("Low", "blue", -1.0, 0.1),
            terrain("High", "green", 0.0, 1.0),
        ];
        assert!(matches!(
            TerrainRegistry::new(entries),
            Err(ConfigError::BandOverlap { .. })
        ));
    }

    #[test]
    fn test_band_coverage_rejected() {
        let entries = vec![terrain("All", "blue", -1.0, 0.9)];
        assert!(matches!(
            TerrainRegistry::new(entries),
            Err(ConfigError::BandCoverage { .. })
        ));
    }

    #[test]
    fn test_classify_boundary_is_lower_inclusive() {
        let registry = TerrainRegistry::overworld();

        // Exactly on a band edge belongs to the band that starts there.
        assert_eq!(registry.get(registry.classify(-0.35)).name, "Water");
        assert_eq!(registry.get(registry.classify(-0.25)).name, "Sand");
        assert_eq!(registry.get(registry.classify(0.15)).name, "Forest");

        assert_eq!(registry.get(registry.classify(-1.0)).name, "DeepWater");
        assert_eq!(registry.get(registry.classify(0.999)).name, "Forest");
    }

    #[test]
    fn test_classify_fallback() {
        let registry = TerrainRegistry::overworld();
        // The top band is half-open, so exactly 1.0 falls back to id 0.
        assert_eq!(registry.classify(1.0), 0);
        assert_eq!(registry.classify(f64::NAN), 0);
    }
}
