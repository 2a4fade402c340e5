//! Nearest-sample spatial index.
//!
//! A uniform bucket grid over the final sample set. The sampler already
//! proves this structure out for rejection tests, so queries reuse it
//! instead of pulling in a tree dependency. The index is read-only after
//! construction; every grid cell in the world resolves its owning sample
//! through `nearest`.

/// Read-only nearest-neighbor index over a fixed point set.
///
/// Ties in nearest distance break to the lowest sample index, which is
/// stable for a given point set because buckets hold indices in insertion
/// order.
pub struct SpatialIndex {
    points: Vec<[f64; 2]>,
    cell_size: f64,
    grid_width: usize,
    grid_height: usize,
    buckets: Vec<Vec<u32>>,
}

impl SpatialIndex {
    /// Build an index over `points` spanning a `width` x `height` domain.
    ///
    /// `cell_size` trades memory for scan width; the sampler's minimum
    /// distance is a good choice since it bounds bucket occupancy.
    pub fn build(points: Vec<[f64; 2]>, width: usize, height: usize, cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");

        let grid_width = ((width as f64 / cell_size).ceil() as usize).max(1);
        let grid_height = ((height as f64 / cell_size).ceil() as usize).max(1);
        let mut buckets = vec![Vec::new(); grid_width * grid_height];

        for (idx, p) in points.iter().enumerate() {
            let (gx, gy) = bucket_of(p[0], p[1], cell_size, grid_width, grid_height);
            buckets[gy * grid_width + gx].push(idx as u32);
        }

        Self {
            points,
            cell_size,
            grid_width,
            grid_height,
            buckets,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> [f64; 2] {
        self.points[index]
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Index of the sample nearest to (x, y), or None for an empty index.
    pub fn nearest(&self, x: f64, y: f64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }

        let (cx, cy) = bucket_of(x, y, self.cell_size, self.grid_width, self.grid_height);

        let mut best: Option<(f64, u32)> = None;
        let max_ring = self.grid_width.max(self.grid_height);

        for ring in 0..=max_ring {
            // Cells `ring` steps away are at least (ring - 1) cells from
            // the query point; once that exceeds the best hit, no farther
            // ring can improve it.
            if let Some((best_d2, _)) = best {
                let ring_floor = (ring as f64 - 1.0).max(0.0) * self.cell_size;
                if ring_floor * ring_floor > best_d2 {
                    break;
                }
            }

            self.scan_ring(cx, cy, ring, |idx, p| {
                let dx = p[0] - x;
                let dy = p[1] - y;
                let d2 = dx * dx + dy * dy;
                match best {
                    None => best = Some((d2, idx)),
                    Some((bd2, bidx)) => {
                        if d2 < bd2 || (d2 == bd2 && idx < bidx) {
                            best = Some((d2, idx));
                        }
                    }
                }
            });
        }

        best.map(|(_, idx)| idx as usize)
    }

    /// Indices of all samples within `radius` (inclusive) of (x, y),
    /// in ascending index order.
    pub fn within_radius(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        if self.points.is_empty() || radius < 0.0 {
            return Vec::new();
        }

        let x_lo = clamp_cell((x - radius) / self.cell_size, self.grid_width);
        let x_hi = clamp_cell((x + radius) / self.cell_size, self.grid_width);
        let y_lo = clamp_cell((y - radius) / self.cell_size, self.grid_height);
        let y_hi = clamp_cell((y + radius) / self.cell_size, self.grid_height);

        let r2 = radius * radius;
        let mut hits = Vec::new();
        for gy in y_lo..=y_hi {
            for gx in x_lo..=x_hi {
                for &idx in &self.buckets[gy * self.grid_width + gx] {
                    let p = self.points[idx as usize];
                    let dx = p[0] - x;
                    let dy = p[1] - y;
                    if dx * dx + dy * dy <= r2 {
                        hits.push(idx as usize);
                    }
                }
            }
        }
        hits.sort_unstable();
        hits
    }

    /// Visit every point in the cells at Chebyshev distance `ring` from
    /// (cx, cy), clamped to the grid.
    fn scan_ring<F: FnMut(u32, [f64; 2])>(&self, cx: usize, cy: usize, ring: usize, mut visit: F) {
        let cx = cx as isize;
        let cy = cy as isize;
        let ring = ring as isize;

        let mut scan_cell = |gx: isize, gy: isize| {
            if gx < 0 || gy < 0 || gx >= self.grid_width as isize || gy >= self.grid_height as isize
            {
                return;
            }
            for &idx in &self.buckets[gy as usize * self.grid_width + gx as usize] {
                visit(idx, self.points[idx as usize]);
            }
        };

        if ring == 0 {
            scan_cell(cx, cy);
            return;
        }

        // Top and bottom rows of the ring, then the side columns between them.
        for gx in (cx - ring)..=(cx + ring) {
            scan_cell(gx, cy - ring);
            scan_cell(gx, cy + ring);
        }
        for gy in (cy - ring + 1)..=(cy + ring - 1) {
            scan_cell(cx - ring, gy);
            scan_cell(cx + ring, gy);
        }
    }
}

fn bucket_of(x: f64, y: f64, cell_size: f64, grid_width: usize, grid_height: usize) -> (usize, usize) {
    (
        clamp_cell(x / cell_size, grid_width),
        clamp_cell(y / cell_size, grid_height),
    )
}

fn clamp_cell(raw: f64, cells: usize) -> usize {
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(cells - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn brute_nearest(points: &[[f64; 2]], x: f64, y: f64) -> usize {
        let mut best = 0;
        let mut best_d2 = f64::INFINITY;
        for (idx, p) in points.iter().enumerate() {
            let dx = p[0] - x;
            let dy = p[1] - y;
            let d2 = dx * dx + dy * dy;
            if d2 < best_d2 {
                best_d2 = d2;
                best = idx;
            }
        }
        best
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(Vec::new(), 100, 100, 5.0);
        assert!(index.is_empty());
        assert_eq!(index.nearest(10.0, 10.0), None);
        assert!(index.within_radius(10.0, 10.0, 50.0).is_empty());
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let points: Vec<[f64; 2]> = (0..500)
            .map(|_| [rng.gen::<f64>() * 200.0, rng.gen::<f64>() * 150.0])
            .collect();
        let index = SpatialIndex::build(points.clone(), 200, 150, 6.0);

        for _ in 0..200 {
            let x = rng.gen::<f64>() * 200.0;
            let y = rng.gen::<f64>() * 150.0;
            assert_eq!(index.nearest(x, y), Some(brute_nearest(&points, x, y)));
        }
    }

    #[test]
    fn test_nearest_handles_queries_outside_domain() {
        let points = vec![[5.0, 5.0], [90.0, 90.0]];
        let index = SpatialIndex::build(points, 100, 100, 10.0);

        assert_eq!(index.nearest(-50.0, -50.0), Some(0));
        assert_eq!(index.nearest(500.0, 500.0), Some(1));
    }

    #[test]
    fn test_nearest_tie_breaks_to_lowest_index() {
        // Two points equidistant from the query along one axis.
        let points = vec![[10.0, 50.0], [30.0, 50.0], [20.0, 10.0]];
        let index = SpatialIndex::build(points, 100, 100, 5.0);

        assert_eq!(index.nearest(20.0, 50.0), Some(0));
    }

    #[test]
    fn test_within_radius_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points: Vec<[f64; 2]> = (0..300)
            .map(|_| [rng.gen::<f64>() * 100.0, rng.gen::<f64>() * 100.0])
            .collect();
        let index = SpatialIndex::build(points.clone(), 100, 100, 4.0);

        for _ in 0..50 {
            let x = rng.gen::<f64>() * 100.0;
            let y = rng.gen::<f64>() * 100.0;
            let radius = rng.gen::<f64>() * 20.0;

            let mut expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| {
                    let dx = p[0] - x;
                    let dy = p[1] - y;
                    dx * dx + dy * dy <= radius * radius
                })
                .map(|(idx, _)| idx)
                .collect();
            expected.sort_unstable();

            assert_eq!(index.within_radius(x, y, radius), expected);
        }
    }
}
