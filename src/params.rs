//! Simulation parameters.
//!
//! [`SimulationParams`] holds every tunable of the simulation. Values are
//! checked once by [`SimulationParams::validate`] when a simulation is built so
//! the per-tick code never has to guard against NaN-producing configuration.
//!
//! Parameters can be written in code with the `with_*` setters or loaded from
//! JSON. Missing JSON fields fall back to [`SimulationParams::default`]:
//!
//! ```
//! use spindrift::SimulationParams;
//!
//! let params = SimulationParams::from_json(r#"{ "particle_radius": 0.05 }"#).unwrap();
//! assert_eq!(params.particle_radius, 0.05);
//! assert_eq!(params.kernel_radius, SimulationParams::default().kernel_radius);
//! ```

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How the bottom of the domain treats particles that fall through it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorMode {
    /// Clamp to the floor like every other wall.
    #[default]
    Clamp,
    /// Teleport the particle back to `y = 0` instead of clamping to the floor.
    /// The ceiling still clamps.
    Reset,
}

/// World bounds that every active particle is kept inside of.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// Axis-aligned box centred on the origin, `[-half_extents, half_extents]`.
    Box {
        /// Half size along each axis.
        half_extents: Vec3,
        /// Floor behaviour at `y = -half_extents.y`.
        #[serde(default)]
        floor: FloorMode,
    },
    /// Vertical cylinder around the Y axis.
    Cylinder {
        /// Horizontal radius in the XZ plane.
        radius: f32,
        /// Half of the vertical extent.
        half_height: f32,
        /// Floor behaviour at `y = -half_height`.
        #[serde(default)]
        floor: FloorMode,
    },
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::Box {
            half_extents: Vec3::splat(1.0),
            floor: FloorMode::Clamp,
        }
    }
}

impl Bounds {
    /// Cube from `-half` to `+half` on every axis.
    pub fn cube(half: f32) -> Self {
        Bounds::Box {
            half_extents: Vec3::splat(half),
            floor: FloorMode::Clamp,
        }
    }

    /// Cylinder with a clamping floor.
    pub fn cylinder(radius: f32, half_height: f32) -> Self {
        Bounds::Cylinder {
            radius,
            half_height,
            floor: FloorMode::Clamp,
        }
    }

    /// Same bounds with a different floor behaviour.
    pub fn with_floor(self, mode: FloorMode) -> Self {
        match self {
            Bounds::Box { half_extents, .. } => Bounds::Box {
                half_extents,
                floor: mode,
            },
            Bounds::Cylinder {
                radius, half_height, ..
            } => Bounds::Cylinder {
                radius,
                half_height,
                floor: mode,
            },
        }
    }

    /// Half of the vertical extent.
    pub fn half_height(&self) -> f32 {
        match self {
            Bounds::Box { half_extents, .. } => half_extents.y,
            Bounds::Cylinder { half_height, .. } => *half_height,
        }
    }

    /// Whether a point lies inside (or on) the bounds.
    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            Bounds::Box { half_extents, .. } => {
                point.x.abs() <= half_extents.x
                    && point.y.abs() <= half_extents.y
                    && point.z.abs() <= half_extents.z
            }
            Bounds::Cylinder {
                radius, half_height, ..
            } => {
                // Small tolerance: projecting onto the circle can land a hair outside.
                let horizontal = (point.x * point.x + point.z * point.z).sqrt();
                horizontal <= *radius * (1.0 + 1e-5) && point.y.abs() <= *half_height
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Bounds::Box { half_extents, .. } => {
                positive("bounds.half_extents.x", half_extents.x)?;
                positive("bounds.half_extents.y", half_extents.y)?;
                positive("bounds.half_extents.z", half_extents.z)
            }
            Bounds::Cylinder {
                radius, half_height, ..
            } => {
                positive("bounds.radius", *radius)?;
                positive("bounds.half_height", *half_height)
            }
        }
    }
}

/// Parameters controlling the simulation.
///
/// Defaults give a small splashy fluid in a unit cube. Coefficients are
/// heuristic knobs, not physical constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Radius of a particle, used for every contact distance.
    pub particle_radius: f32,

    /// Smoothing kernel radius (h). Usually a small multiple of the radius.
    pub kernel_radius: f32,

    /// Equation-of-state stiffness: `pressure = stiffness * (density - rest_density)`.
    pub stiffness: f32,

    /// Density the pressure term measures against.
    pub rest_density: f32,

    /// Constant gravity vector.
    pub gravity: Vec3,

    /// Nominal fixed time step used by [`crate::Simulation::tick`].
    pub delta_time: f32,

    /// World bounds.
    pub bounds: Bounds,

    /// Coefficient of restitution for particle/particle collisions.
    pub restitution: f32,

    /// Restitution for obstacle bounces.
    ///
    /// May exceed 1.0, which makes obstacles add energy on every bounce.
    /// Kept that way on purpose for the energetic splash look.
    pub obstacle_restitution: f32,

    /// Velocity factor applied to the reflected component at world walls.
    pub wall_damping: f32,

    /// Viscosity coefficient (pairs within `2 * particle_radius`).
    pub viscosity: f32,

    /// Cohesion strength (velocity added toward the neighbour average).
    pub cohesion: f32,

    /// Cohesion range as a multiple of `particle_radius`.
    pub cohesion_distance_factor: f32,

    /// Repulsion strength for overlapping pairs.
    pub repulsion: f32,

    /// Surface tension strength (pairs within `2 * particle_radius`).
    pub surface_tension: f32,

    /// Seed for emitters and spawn helpers.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            particle_radius: 0.02,
            kernel_radius: 0.08,
            stiffness: 2.0,
            rest_density: 1000.0,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            delta_time: 1.0 / 60.0,
            bounds: Bounds::default(),
            restitution: 0.5,
            obstacle_restitution: 1.2,
            wall_damping: 0.5,
            viscosity: 0.1,
            cohesion: 0.001,
            cohesion_distance_factor: 4.0,
            repulsion: 50.0,
            surface_tension: 0.0005,
            seed: 0,
        }
    }
}

impl SimulationParams {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the particle radius.
    pub fn with_particle_radius(mut self, radius: f32) -> Self {
        self.particle_radius = radius;
        self
    }

    /// Set the smoothing kernel radius.
    pub fn with_kernel_radius(mut self, radius: f32) -> Self {
        self.kernel_radius = radius;
        self
    }

    /// Set stiffness and rest density of the equation of state.
    pub fn with_pressure(mut self, stiffness: f32, rest_density: f32) -> Self {
        self.stiffness = stiffness;
        self.rest_density = rest_density;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the nominal time step.
    pub fn with_delta_time(mut self, dt: f32) -> Self {
        self.delta_time = dt;
        self
    }

    /// Set the world bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set particle/particle restitution.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set obstacle restitution (may exceed 1.0).
    pub fn with_obstacle_restitution(mut self, restitution: f32) -> Self {
        self.obstacle_restitution = restitution;
        self
    }

    /// Set every pairwise heuristic coefficient at once.
    pub fn with_coefficients(
        mut self,
        viscosity: f32,
        cohesion: f32,
        repulsion: f32,
        surface_tension: f32,
    ) -> Self {
        self.viscosity = viscosity;
        self.cohesion = cohesion;
        self.repulsion = repulsion;
        self.surface_tension = surface_tension;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Contact distance: two radii.
    #[inline]
    pub fn contact_distance(&self) -> f32 {
        2.0 * self.particle_radius
    }

    /// Cohesion neighbourhood radius.
    #[inline]
    pub fn cohesion_range(&self) -> f32 {
        self.particle_radius * self.cohesion_distance_factor
    }

    /// Check every parameter. Called by the simulation builder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("particle_radius", self.particle_radius)?;
        positive("kernel_radius", self.kernel_radius)?;
        positive("rest_density", self.rest_density)?;
        positive("delta_time", self.delta_time)?;
        finite("stiffness", self.stiffness)?;
        finite("gravity.x", self.gravity.x)?;
        finite("gravity.y", self.gravity.y)?;
        finite("gravity.z", self.gravity.z)?;
        non_negative("restitution", self.restitution)?;
        non_negative("obstacle_restitution", self.obstacle_restitution)?;
        non_negative("wall_damping", self.wall_damping)?;
        non_negative("viscosity", self.viscosity)?;
        non_negative("cohesion", self.cohesion)?;
        non_negative("cohesion_distance_factor", self.cohesion_distance_factor)?;
        non_negative("repulsion", self.repulsion)?;
        non_negative("surface_tension", self.surface_tension)?;
        self.bounds.validate()
    }

    /// Parse parameters from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize parameters as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
