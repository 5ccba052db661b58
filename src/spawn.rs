//! Initial particle placement.
//!
//! [`SpawnContext`] wraps a seeded RNG with helpers for common shapes, and
//! [`SpawnRegion`] describes where [`Simulation::fill`](crate::Simulation::fill)
//! puts a batch of particles:
//!
//! ```
//! use spindrift::{Simulation, SimulationParams, SpawnRegion, Vec3};
//!
//! let mut sim = Simulation::new(64, SimulationParams::default()).unwrap();
//! // A block of dormant particles above the middle, released later by an emitter
//! let placed = sim
//!     .fill(
//!         &SpawnRegion::Box { min: Vec3::new(-0.2, 0.5, -0.2), max: Vec3::new(0.2, 0.9, 0.2) },
//!         32,
//!         1.0,
//!         false,
//!     )
//!     .unwrap();
//! assert_eq!(placed, 32);
//! assert_eq!(sim.active_count(), 0);
//! ```
//!
//! Runs are reproducible: the same seed always yields the same positions.

use glam::{UVec3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Seeded random source with shape helpers.
#[derive(Clone, Debug)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random point inside an axis-aligned box.
    pub fn random_in_box(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.random_range(min.x, max.x),
            self.random_range(min.y, max.y),
            self.random_range(min.z, max.z),
        )
    }

    /// Random point inside a cube of given half-size, centered at origin.
    pub fn random_in_cube(&mut self, half_size: f32) -> Vec3 {
        self.random_in_box(Vec3::splat(-half_size), Vec3::splat(half_size))
    }

    /// Random point inside a cylinder along the Y axis, centered at origin.
    pub fn random_in_cylinder(&mut self, radius: f32, half_height: f32) -> Vec3 {
        let theta = self.random_range(0.0, TAU);
        let r = radius * self.random().sqrt(); // sqrt for uniform disk

        Vec3::new(
            r * theta.cos(),
            self.random_range(-half_height, half_height),
            r * theta.sin(),
        )
    }

    /// Random point inside a sphere, uniform over the volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        self.random_direction() * radius * self.random().cbrt()
    }

    /// Random unit vector.
    pub fn random_direction(&mut self) -> Vec3 {
        let theta = self.random_range(0.0, TAU);
        let cos_phi = self.random_range(-1.0, 1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
        Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin())
    }

    /// Random direction within `spread` radians of `axis`.
    pub fn random_in_cone(&mut self, axis: Vec3, spread: f32) -> Vec3 {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let spread = spread.clamp(0.0, PI);
        let angle = self.random_range(0.0, TAU);
        let tilt = self.random_range(0.0, spread);
        let (right, forward) = axis.any_orthonormal_pair();
        (right * tilt.sin() * angle.cos() + forward * tilt.sin() * angle.sin() + axis * tilt.cos()).normalize()
    }
}

/// Where a batch of particles is placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpawnRegion {
    /// Uniformly inside an axis-aligned box.
    Box { min: Vec3, max: Vec3 },
    /// Uniformly inside a vertical cylinder.
    Cylinder {
        center: Vec3,
        radius: f32,
        half_height: f32,
    },
    /// Uniformly inside a sphere.
    Sphere { center: Vec3, radius: f32 },
    /// Regular lattice starting at `origin`, filled X first, then Z, then Y.
    /// Wraps around once every cell is used.
    Lattice {
        origin: Vec3,
        spacing: f32,
        dims: UVec3,
    },
}

impl SpawnRegion {
    /// Position of the `index`-th particle of a batch.
    pub fn sample(&self, index: usize, ctx: &mut SpawnContext) -> Vec3 {
        match self {
            SpawnRegion::Box { min, max } => ctx.random_in_box(min.min(*max), min.max(*max)),
            SpawnRegion::Cylinder {
                center,
                radius,
                half_height,
            } => *center + ctx.random_in_cylinder(*radius, *half_height),
            SpawnRegion::Sphere { center, radius } => *center + ctx.random_in_sphere(*radius),
            SpawnRegion::Lattice {
                origin,
                spacing,
                dims,
            } => *origin + lattice_cell(index, *dims).as_vec3() * *spacing,
        }
    }
}

fn lattice_cell(index: usize, dims: UVec3) -> UVec3 {
    let dims = dims.max(UVec3::ONE);
    let layer = (dims.x * dims.z) as usize;
    let index = index % (layer * dims.y as usize);
    let x = index % dims.x as usize;
    let z = (index / dims.x as usize) % dims.z as usize;
    let y = index / layer;
    UVec3::new(x as u32, y as u32, z as u32)
}
