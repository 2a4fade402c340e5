//! Configuration validation errors.
//!
//! Every variant here is detected before generation starts; a world is
//! never partially generated from a bad configuration.

/// Errors raised while validating world parameters and registries.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero
    InvalidDimensions { width: usize, height: usize },
    /// Minimum sample distance is not a positive finite number
    InvalidMinDistance(f64),
    /// Chunk edge length is zero
    InvalidChunkSize(usize),
    /// A registry has no entries
    EmptyRegistry(&'static str),
    /// A resource weight is negative or non-finite
    InvalidWeight { resource: String, stage: usize },
    /// Every resource has weight zero for this stage, so no draw can succeed
    DegenerateStage(usize),
    /// Terrain bands leave part of the noise co-domain uncovered
    BandGap { at: f64 },
    /// Two terrain bands overlap
    BandOverlap { at: f64 },
    /// Terrain bands do not span exactly [-1, 1]
    BandCoverage { lo: f64, hi: f64 },
    /// A band has lo >= hi
    EmptyBand { name: String },
    /// Terrain noise parameters are unusable
    InvalidTerrainParams(&'static str),
    /// Registry file failed to parse
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDimensions { width, height } => {
                write!(f, "world dimensions must be positive, got {}x{}", width, height)
            }
            ConfigError::InvalidMinDistance(r) => {
                write!(f, "minimum sample distance must be positive, got {}", r)
            }
            ConfigError::InvalidChunkSize(size) => {
                write!(f, "chunk size must be positive, got {}", size)
            }
            ConfigError::EmptyRegistry(which) => {
                write!(f, "{} registry has no entries", which)
            }
            ConfigError::InvalidWeight { resource, stage } => {
                write!(f, "resource '{}' has an invalid weight for stage {}", resource, stage)
            }
            ConfigError::DegenerateStage(stage) => {
                write!(f, "all resource weights for stage {} are zero", stage)
            }
            ConfigError::BandGap { at } => {
                write!(f, "terrain bands leave a gap starting at {}", at)
            }
            ConfigError::BandOverlap { at } => {
                write!(f, "terrain bands overlap at {}", at)
            }
            ConfigError::BandCoverage { lo, hi } => {
                write!(f, "terrain bands cover [{}, {}) instead of [-1, 1)", lo, hi)
            }
            ConfigError::EmptyBand { name } => {
                write!(f, "terrain band '{}' has an empty range", name)
            }
            ConfigError::InvalidTerrainParams(what) => {
                write!(f, "invalid terrain parameters: {}", what)
            }
            ConfigError::Parse(msg) => write!(f, "registry parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
