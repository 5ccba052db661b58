//! External obstacles.
//!
//! Obstacles are axis-aligned boxes owned by the host. The simulation only
//! ever reads them: either from the snapshot installed with
//! [`Simulation::set_obstacles`](crate::Simulation::set_obstacles), which takes
//! effect on the next step, or from a slice borrowed for a single
//! [`Simulation::step_with_obstacles`](crate::Simulation::step_with_obstacles)
//! call.
//!
//! A particle that touches an obstacle is pushed out through the face whose
//! outward normal best matches the direction from the obstacle centre to the
//! particle, skipping faces that would put it outside the world bounds (an
//! obstacle resting on the floor never pushes particles through the floor).
//! Only when every face leads outside does the best-matching face win
//! regardless. The velocity is mirrored across that face and scaled by
//! `obstacle_restitution`. That factor is allowed to exceed 1, which makes
//! obstacles add energy on every hit; scenes are tuned around this bounce.

use crate::params::Bounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// World-space centre.
    pub center: Vec3,
    /// Half size along each axis.
    pub half_extents: Vec3,
}

impl Obstacle {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Box spanning two corners, in any order.
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Whether `point` is inside or on the box.
    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.half_extents).all()
    }

    /// Whether a sphere around `point` touches the box.
    pub fn intersects_sphere(&self, point: Vec3, radius: f32) -> bool {
        let closest = point.clamp(self.min(), self.max());
        (point - closest).length_squared() < radius * radius
    }

    /// Outward face normal with the largest dot product against
    /// `point - center`. Ties go to X before Y before Z, positive first.
    pub fn nearest_face(&self, point: Vec3) -> (usize, f32) {
        self.faces_by_alignment(point)[0]
    }

    /// All six faces, best-aligned first. Ties keep X, Y, Z order with the
    /// positive face first.
    fn faces_by_alignment(&self, point: Vec3) -> [(usize, f32); 6] {
        let d = point - self.center;
        let mut faces = [(0, 1.0), (0, -1.0), (1, 1.0), (1, -1.0), (2, 1.0), (2, -1.0)];
        // Stable sort
        faces.sort_by(|&(a, sa), &(b, sb)| (d[b] * sb).total_cmp(&(d[a] * sa)));
        faces
    }

    /// Where a particle of `radius` at `point` ends up when pushed out
    /// through `face`.
    fn pushed_through(&self, point: Vec3, radius: f32, (axis, sign): (usize, f32)) -> Vec3 {
        let mut out = point;
        out[axis] = self.center[axis] + sign * (self.half_extents[axis] + radius);
        out
    }

    /// Push a particle of `radius` out of the box and bounce it, staying
    /// inside `world` whenever some face allows it.
    ///
    /// Returns `true` if the particle was touching the box.
    pub fn resolve(&self, world: &Bounds, radius: f32, restitution: f32, position: &mut Vec3, velocity: &mut Vec3) -> bool {
        if !self.contains(*position) && !self.intersects_sphere(*position, radius) {
            return false;
        }

        let faces = self.faces_by_alignment(*position);
        let face = faces
            .into_iter()
            .find(|&face| world.contains(self.pushed_through(*position, radius, face)))
            .unwrap_or(faces[0]);
        let (axis, sign) = face;
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;

        *position = self.pushed_through(*position, radius, face);
        *velocity = (*velocity - 2.0 * velocity.dot(normal) * normal) * restitution;
        true
    }
}

/// Resolve every active particle against every obstacle, in list order.
pub fn resolve_all(
    obstacles: &[Obstacle],
    world: &Bounds,
    radius: f32,
    restitution: f32,
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    active: &[bool],
) {
    if obstacles.is_empty() {
        return;
    }
    for i in 0..positions.len() {
        if !active[i] {
            continue;
        }
        for obstacle in obstacles {
            obstacle.resolve(world, radius, restitution, &mut positions[i], &mut velocities[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FloorMode;

    fn open_world() -> Bounds {
        Bounds::cube(10.0)
    }

    #[test]
    fn test_from_min_max() {
        let o = Obstacle::from_min_max(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(o.center, Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(o.half_extents, Vec3::ONE);
        assert_eq!(o.min(), Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn test_sphere_touch() {
        let o = Obstacle::new(Vec3::ZERO, Vec3::splat(0.5));
        assert!(o.intersects_sphere(Vec3::new(0.55, 0.0, 0.0), 0.1));
        assert!(!o.intersects_sphere(Vec3::new(0.7, 0.0, 0.0), 0.1));
        assert!(o.contains(Vec3::new(0.5, 0.5, -0.5)));
    }

    #[test]
    fn test_inside_pushed_through_nearest_face() {
        let o = Obstacle::new(Vec3::ZERO, Vec3::splat(0.5));
        let mut p = Vec3::new(0.1, 0.4, 0.0);
        let mut v = Vec3::new(0.0, -1.0, 0.5);
        assert!(o.resolve(&open_world(), 0.05, 1.0, &mut p, &mut v));

        assert!((p.y - 0.55).abs() < 1e-6);
        assert_eq!(p.x, 0.1);
        assert_eq!(v, Vec3::new(0.0, 1.0, 0.5));
        assert!(!o.contains(p));
    }

    #[test]
    fn test_restitution_can_amplify() {
        let o = Obstacle::new(Vec3::ZERO, Vec3::splat(0.5));
        let mut p = Vec3::new(-0.45, 0.0, 0.0);
        let mut v = Vec3::new(1.0, 0.0, 0.0);
        o.resolve(&open_world(), 0.1, 1.5, &mut p, &mut v);
        assert!((p.x + 0.6).abs() < 1e-6);
        assert_eq!(v.x, -1.5);
    }

    #[test]
    fn test_far_particle_untouched() {
        let o = Obstacle::new(Vec3::ZERO, Vec3::splat(0.5));
        let mut p = Vec3::new(2.0, 0.0, 0.0);
        let mut v = Vec3::X;
        assert!(!o.resolve(&open_world(), 0.1, 1.0, &mut p, &mut v));
        assert_eq!((p, v), (Vec3::new(2.0, 0.0, 0.0), Vec3::X));
    }

    #[test]
    fn test_resolve_all_skips_dormant() {
        let obstacles = [Obstacle::new(Vec3::ZERO, Vec3::splat(0.5))];
        let mut positions = vec![Vec3::ZERO, Vec3::ZERO];
        let mut velocities = vec![Vec3::ZERO; 2];
        resolve_all(&obstacles, &open_world(), 0.1, 1.0, &mut positions, &mut velocities, &[false, true]);
        assert_eq!(positions[0], Vec3::ZERO);
        assert_ne!(positions[1], Vec3::ZERO);
    }

    #[test]
    fn test_floor_resting_obstacle_pushes_sideways() {
        let world = Bounds::cylinder(0.6, 1.0);
        let pedestal = Obstacle::new(Vec3::new(0.0, -0.85, 0.0), Vec3::new(0.2, 0.15, 0.2));
        let mut p = Vec3::new(0.05, -0.97, 0.0);
        let mut v = Vec3::ZERO;
        assert!(pedestal.resolve(&world, 0.02, 1.0, &mut p, &mut v));

        // The floor face would land below y = -1, so the +X face wins
        assert!((p.x - 0.22).abs() < 1e-6);
        assert_eq!(p.y, -0.97);
        assert!(world.contains(p));
        assert!(!pedestal.contains(p));
    }

    #[test]
    fn test_all_faces_outside_falls_back_to_nearest() {
        let world = Bounds::cube(0.5).with_floor(FloorMode::Clamp);
        let o = Obstacle::new(Vec3::ZERO, Vec3::splat(0.5));
        let mut p = Vec3::new(0.1, 0.4, 0.0);
        let mut v = Vec3::new(0.0, -1.0, 0.0);
        assert!(o.resolve(&world, 0.05, 1.0, &mut p, &mut v));
        assert!((p.y - 0.55).abs() < 1e-6);
        assert_eq!(v, Vec3::new(0.0, 1.0, 0.0));
    }
}
