//! Blue-noise sample generation (Poisson disc sampling).
//!
//! Bridson's active-list algorithm: a background grid with cell size
//! `r / sqrt(2)` makes neighborhood rejection O(1) per candidate, and the
//! active list shrinks organically as points run out of room. Termination
//! is organic, not exhaustive; the point count varies with the seed.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::ConfigError;

const TAU: f64 = std::f64::consts::TAU;

/// Parameters for Poisson disc sampling.
#[derive(Clone, Copy, Debug)]
pub struct SampleParams {
    /// Domain width (points land in [0, width))
    pub width: usize,
    /// Domain height (points land in [0, height))
    pub height: usize,
    /// Minimum pairwise distance between samples
    pub min_distance: f64,
    /// Candidates attempted per active point before it retires
    pub attempts: usize,
}

impl SampleParams {
    pub fn new(width: usize, height: usize, min_distance: f64) -> Self {
        Self {
            width,
            height,
            min_distance,
            attempts: 5,
        }
    }

    /// Reject configurations that cannot produce a valid sample set.
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
        Ok(())
    }
}

/// Generate Poisson disc samples over the configured domain.
///
/// Every pair of returned points is at least `min_distance` apart
/// (Euclidean). Identical parameters and RNG state produce an identical
/// point set, in the same order.
pub fn poisson_disc_samples(
    params: &SampleParams,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<[f64; 2]>, ConfigError> {
    params.validate()?;

    let width = params.width as f64;
    let height = params.height as f64;
    let r = params.min_distance;
    let cell_size = r / std::f64::consts::SQRT_2;

    let grid_width = (width / cell_size).ceil() as usize;
    let grid_height = (height / cell_size).ceil() as usize;

    // One point per cell at most, by construction.
    let mut grid: Vec<Option<u32>> = vec![None; grid_width * grid_height];
    let grid_coords = |p: [f64; 2]| -> (usize, usize) {
        (
            ((p[0] / cell_size) as usize).min(grid_width - 1),
            ((p[1] / cell_size) as usize).min(grid_height - 1),
        )
    };

    let mut points: Vec<[f64; 2]> = Vec::new();
    let mut active: Vec<u32> = Vec::new();

    // Seed with one uniformly random point.
    let first = [width * rng.gen::<f64>(), height * rng.gen::<f64>()];
    let (gx, gy) = grid_coords(first);
    grid[gy * grid_width + gx] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let p = points[active[slot] as usize];
        let mut accepted_any = false;

        for _ in 0..params.attempts {
            // Candidate in the annulus [r, 2r) around p: uniform angle,
            // distance r * sqrt(3u + 1).
            let alpha = TAU * rng.gen::<f64>();
            let dist = r * (3.0 * rng.gen::<f64>() + 1.0).sqrt();
            let q = [p[0] + dist * alpha.cos(), p[1] + dist * alpha.sin()];

            if q[0] < 0.0 || q[0] >= width || q[1] < 0.0 || q[1] >= height {
                continue;
            }

            let (qx, qy) = grid_coords(q);

            // Any point closer than r lies within two cells of q, because
            // r spans sqrt(2) cells. Scan the 5x5 neighborhood.
            let x_lo = qx.saturating_sub(2);
            let x_hi = (qx + 2).min(grid_width - 1);
            let y_lo = qy.saturating_sub(2);
            let y_hi = (qy + 2).min(grid_height - 1);

            let mut too_close = false;
            'scan: for y in y_lo..=y_hi {
                for x in x_lo..=x_hi {
                    if let Some(idx) = grid[y * grid_width + x] {
                        let other = points[idx as usize];
                        let dx = q[0] - other[0];
                        let dy = q[1] - other[1];
                        if dx * dx + dy * dy < r * r {
                            too_close = true;
                            break 'scan;
                        }
                    }
                }
            }
            if too_close {
                continue;
            }

            let idx = points.len() as u32;
            grid[qy * grid_width + qx] = Some(idx);
            points.push(q);
            active.push(idx);
            accepted_any = true;
        }

        // A point that yielded nothing this round has no room left.
        if !accepted_any {
            active.swap_remove(slot);
        }
    }

    Ok(points)
}

/// Truncate sample coordinates to the integer grid (floor, not round).
pub fn floor_points(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p[0].floor(), p[1].floor()]).collect()
}
