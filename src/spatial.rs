//! Neighbor queries.
//!
//! Every pairwise stage (density, forces, collisions) asks one question: which
//! active particles lie within some radius of particle `i`? That question is
//! answered through the [`NeighborQuery`] trait so the search strategy can be
//! swapped without touching any force or collision code.
//!
//! Two strategies ship with the crate:
//!
//! | Strategy | Cost per query | Notes |
//! |----------|----------------|-------|
//! | [`AllPairs`] | O(n) | Scans every particle. Simple and exact; the scalability limit of the whole simulation. |
//! | [`UniformGrid`] | O(k) | Buckets particles into cubic cells. Cell size should be close to the largest query radius. |
//!
//! Both visit neighbors in a deterministic order, so a simulation run is
//! reproducible for a given strategy.

use glam::{IVec3, Vec3};
use std::collections::HashMap;

/// Search strategy for "every active particle within `radius`".
///
/// Callbacks receive the neighbor index `j`, the offset `positions[j] -
/// positions[i]` and the distance. Coincident particles are reported with a
/// distance of zero; callers that need a direction must skip them.
pub trait NeighborQuery {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Refresh internal acceleration structures after positions changed.
    fn rebuild(&mut self, positions: &[Vec3], active: &[bool]);

    /// Visit every active `j != i` with `|p_j - p_i| < radius`.
    fn for_each_neighbor(
        &self,
        i: usize,
        positions: &[Vec3],
        active: &[bool],
        radius: f32,
        f: &mut dyn FnMut(usize, Vec3, f32),
    );

    /// Visit every unordered active pair `(i, j)`, `i < j`, closer than `radius`.
    fn for_each_pair(
        &self,
        positions: &[Vec3],
        active: &[bool],
        radius: f32,
        f: &mut dyn FnMut(usize, usize, Vec3, f32),
    ) {
        for i in 0..positions.len() {
            if !active[i] {
                continue;
            }
            self.for_each_neighbor(i, positions, active, radius, &mut |j, offset, dist| {
                if j > i {
                    f(i, j, offset, dist);
                }
            });
        }
    }
}

/// Brute-force O(n²) neighbor search.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllPairs;

impl NeighborQuery for AllPairs {
    fn name(&self) -> &'static str {
        "all-pairs"
    }

    fn rebuild(&mut self, _positions: &[Vec3], _active: &[bool]) {}

    fn for_each_neighbor(
        &self,
        i: usize,
        positions: &[Vec3],
        active: &[bool],
        radius: f32,
        f: &mut dyn FnMut(usize, Vec3, f32),
    ) {
        let radius_sq = radius * radius;
        let pi = positions[i];
        for (j, &pj) in positions.iter().enumerate() {
            if j == i || !active[j] {
                continue;
            }
            let offset = pj - pi;
            let dist_sq = offset.length_squared();
            if dist_sq < radius_sq {
                f(j, offset, dist_sq.sqrt());
            }
        }
    }

    fn for_each_pair(
        &self,
        positions: &[Vec3],
        active: &[bool],
        radius: f32,
        f: &mut dyn FnMut(usize, usize, Vec3, f32),
    ) {
        let radius_sq = radius * radius;
        let n = positions.len();
        for i in 0..n {
            if !active[i] {
                continue;
            }
            let pi = positions[i];
            for j in (i + 1)..n {
                if !active[j] {
                    continue;
                }
                let offset = positions[j] - pi;
                let dist_sq = offset.length_squared();
                if dist_sq < radius_sq {
                    f(i, j, offset, dist_sq.sqrt());
                }
            }
        }
    }
}

/// Uniform spatial hash grid.
///
/// Particles are bucketed by `floor(position / cell_size)`. A query of radius
/// `r` scans `ceil(r / cell_size)` cells in every direction, so any radius is
/// answered correctly; it is only fast when `r` is close to `cell_size`.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<usize>>,
}

impl UniformGrid {
    /// Create a grid with the given cell size.
    ///
    /// Non-positive or non-finite sizes fall back to 1.0.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells after the last rebuild.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_of(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }
}

impl NeighborQuery for UniformGrid {
    fn name(&self) -> &'static str {
        "uniform-grid"
    }

    fn rebuild(&mut self, positions: &[Vec3], active: &[bool]) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, &p) in positions.iter().enumerate() {
            if active[i] {
                let cell = self.cell_of(p);
                self.cells.entry(cell).or_default().push(i);
            }
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    fn for_each_neighbor(
        &self,
        i: usize,
        positions: &[Vec3],
        active: &[bool],
        radius: f32,
        f: &mut dyn FnMut(usize, Vec3, f32),
    ) {
        let radius_sq = radius * radius;
        let pi = positions[i];
        let center = self.cell_of(pi);
        let reach = (radius / self.cell_size).ceil().max(1.0) as i32;

        for dz in -reach..=reach {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let Some(bucket) = self.cells.get(&(center + IVec3::new(dx, dy, dz))) else {
                        continue;
                    };
                    for &j in bucket {
                        if j == i || !active[j] {
                            continue;
                        }
                        let offset = positions[j] - pi;
                        let dist_sq = offset.length_squared();
                        if dist_sq < radius_sq {
                            f(j, offset, dist_sq.sqrt());
                        }
                    }
                }
            }
        }
    }
}
