//! Force accumulation.
//!
//! Forces are applied as velocity changes, one [`ForceStage`] at a time, in
//! the order given to the simulation. The default order is
//! [`ForceStage::DEFAULT_ORDER`]:
//!
//! | Stage | Pairs | Effect |
//! |-------|-------|--------|
//! | [`ForceStage::Viscosity`] | within `2r` | relative velocity along the pair axis, added to `i` and taken from `j`, scaled by `dt / mass` |
//! | [`ForceStage::Gravity`] | none | `v += gravity · dt / mass` |
//! | [`ForceStage::Cohesion`] | within `r · cohesion_distance_factor` | steers toward the average neighbor direction |
//! | [`ForceStage::Repulsion`] | within `2r` | pushes overlapping pairs apart |
//! | [`ForceStage::SurfaceTension`] | within `2r` | small pull between touching pairs |
//!
//! These are heuristics tuned for looks, not derived from SPH. Cohesion,
//! repulsion and surface tension are raw velocity kicks with no `dt` factor.
//!
//! No stage reads density or pressure. They are refreshed before the first
//! stage runs (see [`density::evaluate`](crate::density::evaluate)) and are
//! exposed through [`Simulation::density`](crate::Simulation::density) and
//! [`Simulation::pressure`](crate::Simulation::pressure), but the
//! density-seeking look comes from the pairwise terms alone. There is no
//! pressure-gradient force.
//!
//! Inside one stage every pair reads the velocities as they were when the
//! stage started; the resulting deltas are summed and applied together. A
//! stage's result therefore does not depend on pair visiting order beyond
//! float summation order.
//!
//! Every stage that needs a direction skips pairs closer than
//! [`MIN_SEPARATION`] instead of dividing by zero.

use crate::params::SimulationParams;
use crate::spatial::NeighborQuery;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pairs closer than this have no usable direction and are skipped.
pub const MIN_SEPARATION: f32 = 1e-6;

/// One step of the force pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceStage {
    /// Pairwise kick from relative velocity along the separation axis.
    Viscosity,
    /// Constant gravity, divided by particle mass.
    Gravity,
    /// Steer toward the average direction of nearby particles.
    Cohesion,
    /// Push overlapping pairs apart.
    Repulsion,
    /// Pull touching pairs together.
    SurfaceTension,
}

impl ForceStage {
    /// Order used unless the simulation is given another.
    pub const DEFAULT_ORDER: [ForceStage; 5] = [
        ForceStage::Viscosity,
        ForceStage::Gravity,
        ForceStage::Cohesion,
        ForceStage::Repulsion,
        ForceStage::SurfaceTension,
    ];
}

/// Borrowed state a force stage works on.
pub struct ForceContext<'a, N: NeighborQuery + ?Sized> {
    pub query: &'a N,
    pub params: &'a SimulationParams,
    pub dt: f32,
    pub positions: &'a [Vec3],
    pub masses: &'a [f32],
    pub active: &'a [bool],
}

/// Run one stage, updating `velocities` in place.
///
/// `scratch` is reused between calls to avoid reallocating every tick.
pub fn apply_stage<N: NeighborQuery + ?Sized>(
    stage: ForceStage,
    ctx: &ForceContext<'_, N>,
    velocities: &mut [Vec3],
    scratch: &mut Vec<Vec3>,
) {
    scratch.clear();
    scratch.resize(velocities.len(), Vec3::ZERO);

    match stage {
        ForceStage::Gravity => {
            apply_gravity(ctx, velocities);
            return;
        }
        ForceStage::Viscosity => viscosity(ctx, velocities, scratch),
        ForceStage::Cohesion => cohesion(ctx, scratch),
        ForceStage::Repulsion => repulsion(ctx, scratch),
        ForceStage::SurfaceTension => surface_tension(ctx, scratch),
    }

    for (i, delta) in scratch.iter().enumerate() {
        if ctx.active[i] {
            velocities[i] += *delta;
        }
    }
}

fn apply_gravity<N: NeighborQuery + ?Sized>(ctx: &ForceContext<'_, N>, velocities: &mut [Vec3]) {
    let g = ctx.params.gravity * ctx.dt;
    for (i, v) in velocities.iter_mut().enumerate() {
        if ctx.active[i] {
            *v += g / ctx.masses[i];
        }
    }
}

fn viscosity<N: NeighborQuery + ?Sized>(
    ctx: &ForceContext<'_, N>,
    velocities: &[Vec3],
    deltas: &mut [Vec3],
) {
    let coeff = ctx.params.viscosity;
    if coeff == 0.0 {
        return;
    }
    let max_dist = ctx.params.contact_distance();

    ctx.query.for_each_pair(ctx.positions, ctx.active, max_dist, &mut |i, j, offset, dist| {
        if dist < MIN_SEPARATION {
            return;
        }
        let normal = offset / dist;
        let along = (velocities[i] - velocities[j]).dot(normal);
        let falloff = (max_dist - dist) / max_dist;
        let force = normal * along * coeff * falloff;

        // `+` on i and `-` on j widens the relative velocity along the axis
        // rather than damping it. Scenes are tuned against this sign.
        deltas[i] += force * (ctx.dt / ctx.masses[i]);
        deltas[j] -= force * (ctx.dt / ctx.masses[j]);
    });
}

fn cohesion<N: NeighborQuery + ?Sized>(ctx: &ForceContext<'_, N>, deltas: &mut [Vec3]) {
    let strength = ctx.params.cohesion;
    let range = ctx.params.cohesion_range();
    if strength == 0.0 || range <= 0.0 {
        return;
    }

    for i in 0..ctx.positions.len() {
        if !ctx.active[i] {
            continue;
        }
        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        ctx.query.for_each_neighbor(i, ctx.positions, ctx.active, range, &mut |_, offset, dist| {
            if dist >= MIN_SEPARATION {
                sum += offset / dist;
                count += 1;
            }
        });
        if count == 0 {
            continue;
        }
        let average = sum / count as f32;
        if average.length_squared() > MIN_SEPARATION * MIN_SEPARATION {
            deltas[i] += average.normalize() * strength;
        }
    }
}

fn repulsion<N: NeighborQuery + ?Sized>(ctx: &ForceContext<'_, N>, deltas: &mut [Vec3]) {
    let strength = ctx.params.repulsion;
    if strength == 0.0 {
        return;
    }
    let ideal = ctx.params.contact_distance();

    ctx.query.for_each_pair(ctx.positions, ctx.active, ideal, &mut |i, j, offset, dist| {
        if dist < MIN_SEPARATION {
            return;
        }
        let push = offset / dist * strength * (ideal - dist);
        deltas[i] -= push;
        deltas[j] += push;
    });
}

fn surface_tension<N: NeighborQuery + ?Sized>(ctx: &ForceContext<'_, N>, deltas: &mut [Vec3]) {
    let strength = ctx.params.surface_tension;
    if strength == 0.0 {
        return;
    }
    let max_dist = ctx.params.contact_distance();

    ctx.query.for_each_pair(ctx.positions, ctx.active, max_dist, &mut |i, j, offset, dist| {
        if dist < MIN_SEPARATION {
            return;
        }
        let pull = offset / dist * strength * (max_dist - dist) / max_dist;
        deltas[i] += pull;
        deltas[j] -= pull;
    });
}
