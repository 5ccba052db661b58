//! Position integration and world-bound containment.

use crate::params::{Bounds, FloorMode};
use glam::Vec3;

/// Advance every active particle by `velocity · dt`.
pub fn integrate(positions: &mut [Vec3], velocities: &[Vec3], active: &[bool], dt: f32) {
    for (i, p) in positions.iter_mut().enumerate() {
        if active[i] {
            *p += velocities[i] * dt;
        }
    }
}

/// Pull every active particle back inside `bounds`.
///
/// `wall_damping` scales the reflected velocity on box faces and on the
/// vertical extent of a cylinder.
pub fn contain(bounds: &Bounds, wall_damping: f32, positions: &mut [Vec3], velocities: &mut [Vec3], active: &[bool]) {
    for i in 0..positions.len() {
        if active[i] {
            contain_point(bounds, wall_damping, &mut positions[i], &mut velocities[i]);
        }
    }
}

/// Containment for a single particle.
///
/// # Box
///
/// Each axis is clamped to `[-half, half]` on its own; a clamped axis has its
/// velocity negated and scaled by `wall_damping`. With [`FloorMode::Reset`] a
/// particle below the floor is moved to `y = 0` instead.
///
/// # Cylinder
///
/// A particle past the wall is projected back onto the circle and loses the
/// outward normal part of its horizontal velocity; the tangential part is
/// kept as-is. The vertical axis behaves like a box axis.
pub fn contain_point(bounds: &Bounds, wall_damping: f32, position: &mut Vec3, velocity: &mut Vec3) {
    match *bounds {
        Bounds::Box { half_extents, floor } => {
            clamp_axis(&mut position.x, &mut velocity.x, half_extents.x, wall_damping);
            vertical(&mut position.y, &mut velocity.y, half_extents.y, floor, wall_damping);
            clamp_axis(&mut position.z, &mut velocity.z, half_extents.z, wall_damping);
        }
        Bounds::Cylinder {
            radius,
            half_height,
            floor,
        } => {
            let horizontal = Vec3::new(position.x, 0.0, position.z);
            let dist = horizontal.length();
            if dist > radius {
                let normal = horizontal / dist;
                position.x = normal.x * radius;
                position.z = normal.z * radius;

                // Remove only the normal component of the horizontal velocity
                let along = velocity.x * normal.x + velocity.z * normal.z;
                velocity.x -= along * normal.x;
                velocity.z -= along * normal.z;
            }
            vertical(&mut position.y, &mut velocity.y, half_height, floor, wall_damping);
        }
    }
}

fn clamp_axis(pos: &mut f32, vel: &mut f32, half: f32, damping: f32) {
    if *pos < -half {
        *pos = -half;
        *vel = -*vel * damping;
    } else if *pos > half {
        *pos = half;
        *vel = -*vel * damping;
    }
}

fn vertical(pos: &mut f32, vel: &mut f32, half: f32, floor: FloorMode, damping: f32) {
    if floor == FloorMode::Reset && *pos < -half {
        // Falls through the floor, reappears mid-domain
        *pos = 0.0;
        *vel = -*vel * damping;
        return;
    }
    clamp_axis(pos, vel, half, damping);
}
