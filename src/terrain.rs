//! Coherent-noise terrain field.
//!
//! Multi-octave Perlin fbm evaluated at absolute grid coordinates. The
//! field is sampled on a torus: each axis maps to a circle in 4D noise
//! space, so the field tiles exactly at the configured period in both
//! directions. Coordinates are reduced modulo the period before the angle
//! mapping, which makes the tiling bit-exact rather than approximate.

use noise::{NoiseFn, Perlin, Seedable};

use crate::error::ConfigError;

const TAU: f64 = std::f64::consts::TAU;

/// Parameters for terrain noise.
#[derive(Clone, Copy, Debug)]
pub struct TerrainParams {
    /// Base frequency (lower = larger features)
    pub frequency: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Tiling period in grid units, both axes
    pub period: f64,
}

impl TerrainParams {
    /// Reject parameter sets the fbm accumulator cannot evaluate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::InvalidTerrainParams("octaves must be at least 1"));
        }
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::InvalidTerrainParams("frequency must be positive"));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 {
            return Err(ConfigError::InvalidTerrainParams("persistence must be positive"));
        }
        if !self.lacunarity.is_finite() || self.lacunarity <= 0.0 {
            return Err(ConfigError::InvalidTerrainParams("lacunarity must be positive"));
        }
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(ConfigError::InvalidTerrainParams("period must be positive"));
        }
        Ok(())
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            frequency: 0.02,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            period: 1024.0,
        }
    }
}

/// Seeded, periodic terrain noise field.
///
/// Evaluation is independent per cell, so callers are free to fill whole
/// grids in parallel.
pub struct TerrainField {
    noise: Perlin,
    params: TerrainParams,
}

impl TerrainField {
    pub fn new(seed: u64, params: TerrainParams) -> Self {
        Self {
            noise: Perlin::new(1).set_seed(seed as u32),
            params,
        }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Noise value at absolute grid coordinates, in [-1, 1].
    pub fn value(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;

        // Map each axis onto a circle; arc length per grid unit equals the
        // base frequency, so feature size matches a plain 2D sampling.
        let scale = p.frequency * p.period / TAU;
        let theta_x = TAU * x.rem_euclid(p.period) / p.period;
        let theta_y = TAU * y.rem_euclid(p.period) / p.period;
        let circle = [
            theta_x.cos() * scale,
            theta_x.sin() * scale,
            theta_y.cos() * scale,
            theta_y.sin() * scale,
        ];

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..p.octaves {
            let sample = [
                circle[0] * frequency,
                circle[1] * frequency,
                circle[2] * frequency,
                circle[3] * frequency,
            ];
            total += amplitude * self.noise.get(sample);
            max_value += amplitude;
            amplitude *= p.persistence;
            frequency *= p.lacunarity;
        }

        (total / max_value).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_stay_in_range() {
        let field = TerrainField::new(42, TerrainParams::default());
        for y in 0..64 {
            for x in 0..64 {
                let v = field.value(x as f64 * 3.7, y as f64 * 3.7);
                assert!((-1.0..=1.0).contains(&v), "value {} out of range", v);
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = TerrainField::new(42, TerrainParams::default());
        let b = TerrainField::new(42, TerrainParams::default());
        for i in 0..100 {
            let x = i as f64 * 1.3;
            let y = i as f64 * 0.7;
            assert_eq!(a.value(x, y), b.value(x, y));
        }
    }

    #[test]
    fn test_different_seed_different_field() {
        let a = TerrainField::new(1, TerrainParams::default());
        let b = TerrainField::new(2, TerrainParams::default());
        let differs = (0..50).any(|i| {
            let x = i as f64 * 2.1;
            a.value(x, x) != b.value(x, x)
        });
        assert!(differs);
    }

    #[test]
    fn test_field_tiles_at_period() {
        let params = TerrainParams {
            period: 256.0,
            ..TerrainParams::default()
        };
        let field = TerrainField::new(42, params);

        // Quarter-unit steps keep x + period exactly representable, so the
        // comparison can be exact rather than approximate.
        for i in 0..50 {
            let x = i as f64 * 5.25;
            let y = i as f64 * 2.75;
            assert_eq!(field.value(x, y), field.value(x + 256.0, y));
            assert_eq!(field.value(x, y), field.value(x, y + 256.0));
            assert_eq!(field.value(x, y), field.value(x + 512.0, y + 256.0));
        }
    }
}
