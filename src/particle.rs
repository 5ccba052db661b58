//! Renderer-facing particle view.
//!
//! The simulation keeps its particles in a structure-of-arrays store. Once per
//! frame a host reads them back as a flat list of [`ParticleSnapshot`]s. The
//! layout is `#[repr(C)]` and `Pod`, so the list can be handed to a GPU buffer
//! with `bytemuck::cast_slice` and no conversion pass.

use glam::Vec3;

/// One particle as seen by a renderer.
///
/// 32 bytes, 16-byte friendly: `position` + `active` and `velocity` +
/// `density` each fill a `vec4`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleSnapshot {
    /// World-space position.
    pub position: [f32; 3],
    /// 1 if the particle is simulated, 0 if dormant.
    pub active: u32,
    /// Velocity.
    pub velocity: [f32; 3],
    /// Density from the most recent step (0 for dormant particles).
    pub density: f32,
}

impl ParticleSnapshot {
    /// Build a snapshot entry.
    pub fn new(position: Vec3, velocity: Vec3, active: bool, density: f32) -> Self {
        Self {
            position: position.to_array(),
            active: active as u32,
            velocity: velocity.to_array(),
            density,
        }
    }

    /// Position as a vector.
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Velocity as a vector.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    /// Whether the particle is simulated.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active != 0
    }
}
