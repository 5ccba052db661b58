//! # Spindrift - heuristic particle fluid
//!
//! A small, deterministic particle fluid for visual effects. Point masses
//! move under gravity and a handful of pairwise heuristics, bounce off the
//! world bounds and each other, and get pushed out of host-owned obstacles.
//! It looks like a fluid; it does not try to be one.
//!
//! ## Quick Start
//!
//! ```
//! use spindrift::prelude::*;
//!
//! let params = SimulationParams::default()
//!     .with_particle_radius(0.02)
//!     .with_bounds(Bounds::cylinder(0.5, 1.0));
//!
//! let mut sim = Simulation::new(256, params).unwrap();
//! sim.fill(
//!     &SpawnRegion::Cylinder { center: Vec3::new(0.0, 0.5, 0.0), radius: 0.3, half_height: 0.2 },
//!     256,
//!     1.0,
//!     true,
//! )
//! .unwrap();
//!
//! for _ in 0..60 {
//!     sim.tick();
//! }
//!
//! // Hand the frame to a renderer
//! let frame = sim.snapshot();
//! let bytes: &[u8] = spindrift::bytemuck::cast_slice(&frame);
//! assert_eq!(bytes.len(), 256 * std::mem::size_of::<ParticleSnapshot>());
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Particles live in a fixed-capacity [`ParticleStore`]. Slots are never
//! freed, only deactivated and reused. Dormant particles can be placed up
//! front and released over time by an [`Emitter`].
//!
//! ### Tick
//!
//! Every [`Simulation::step`] runs, in order:
//!
//! 1. density and pressure from a poly6 kernel sum
//! 2. the [`ForceStage`] pipeline (viscosity, gravity, cohesion, repulsion, surface tension)
//! 3. integration and world-bound containment
//! 4. particle/particle impulses
//! 5. obstacle push-out
//!
//! After every step each active particle is inside the [`Bounds`].
//!
//! ### Neighbor search
//!
//! Every pairwise phase goes through a [`NeighborQuery`]. The default
//! [`AllPairs`] is O(n²) and is what limits particle counts; swap in a
//! [`UniformGrid`] for larger scenes:
//!
//! ```
//! # use spindrift::prelude::*;
//! let params = SimulationParams::default();
//! let sim = Simulation::new(10_000, params.clone())
//!     .unwrap()
//!     .with_neighbor_query(UniformGrid::new(params.kernel_radius));
//! ```
//!
//! ## Scenes
//!
//! A whole setup (parameters, force stages, obstacles, emitters and initial
//! batches) can be stored as JSON with [`SceneConfig`] and rebuilt with
//! [`SceneConfig::build`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: construction at `info`,
//! emitter progress and ignored steps at `debug`, rejected spawns at `warn`.
//! Install any logger (the demos use `env_logger`) to see them.

pub mod collision;
pub mod density;
pub mod emitter;
pub mod error;
pub mod forces;
pub mod integrate;
pub mod kernel;
pub mod obstacle;
pub mod params;
pub mod particle;
pub mod scene;
mod simulation;
pub mod spatial;
pub mod spawn;
pub mod store;
pub mod time;

pub use bytemuck;
pub use glam::{UVec3, Vec3};

pub use emitter::Emitter;
pub use error::{ConfigError, SceneError, SpawnError};
pub use forces::ForceStage;
pub use obstacle::Obstacle;
pub use params::{Bounds, FloorMode, SimulationParams};
pub use particle::ParticleSnapshot;
pub use scene::{SceneConfig, SpawnBatch};
pub use simulation::Simulation;
pub use spatial::{AllPairs, NeighborQuery, UniformGrid};
pub use spawn::{SpawnContext, SpawnRegion};
pub use store::ParticleStore;
pub use time::SimTime;

/// Convenient re-exports for common usage.
///
/// ```
/// use spindrift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::emitter::Emitter;
    pub use crate::error::{ConfigError, SceneError, SpawnError};
    pub use crate::forces::ForceStage;
    pub use crate::obstacle::Obstacle;
    pub use crate::params::{Bounds, FloorMode, SimulationParams};
    pub use crate::particle::ParticleSnapshot;
    pub use crate::scene::{SceneConfig, SpawnBatch};
    pub use crate::simulation::Simulation;
    pub use crate::spatial::{AllPairs, NeighborQuery, UniformGrid};
    pub use crate::spawn::SpawnRegion;
    pub use crate::{UVec3, Vec3};
}
