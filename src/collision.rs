//! Particle/particle collision response.
//!
//! Runs after integration as a separate correction pass. Pairs closer than
//! `2 · particle_radius` that are still approaching exchange an impulse along
//! the contact normal:
//!
//! ```text
//! impulse = −(1 + restitution) · v_n / (1/m_i + 1/m_j)
//! ```
//!
//! where `v_n` is the relative velocity of `j` with respect to `i` along the
//! normal from `i` to `j`. Separating pairs (`v_n > 0`) are left alone, so a
//! pair that has already bounced is not bounced again next tick.
//!
//! Unlike the force stages, velocities are updated in place while pairs are
//! visited, so a particle touching several others sees the earlier impulses.

use crate::forces::MIN_SEPARATION;
use crate::spatial::NeighborQuery;
use glam::Vec3;

/// Impulse vector applied to `j` (and negated on `i`) for one contact.
///
/// `normal` points from `i` to `j`. Returns `None` if the pair is separating.
#[inline]
pub fn contact_impulse(
    normal: Vec3,
    vi: Vec3,
    vj: Vec3,
    mi: f32,
    mj: f32,
    restitution: f32,
) -> Option<Vec3> {
    let along = (vj - vi).dot(normal);
    if along > 0.0 {
        return None;
    }
    let magnitude = -(1.0 + restitution) * along / (1.0 / mi + 1.0 / mj);
    Some(normal * magnitude)
}

/// Resolve every touching pair once. Returns the number of impulses applied.
pub fn resolve_pairs<N: NeighborQuery + ?Sized>(
    query: &N,
    contact_distance: f32,
    restitution: f32,
    positions: &[Vec3],
    velocities: &mut [Vec3],
    masses: &[f32],
    active: &[bool],
) -> usize {
    let mut contacts = 0;
    query.for_each_pair(positions, active, contact_distance, &mut |i, j, offset, dist| {
        if dist < MIN_SEPARATION {
            return;
        }
        let normal = offset / dist;
        if let Some(impulse) = contact_impulse(normal, velocities[i], velocities[j], masses[i], masses[j], restitution) {
            velocities[i] -= impulse / masses[i];
            velocities[j] += impulse / masses[j];
            contacts += 1;
        }
    });
    contacts
}
