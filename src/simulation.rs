//! Simulation driver.
//!
//! A [`Simulation`] owns the particle store, the neighbor query and the
//! emitters, and runs the phases of one tick in a fixed order:
//!
//! 1. emitters release dormant particles
//! 2. density and pressure are recomputed
//! 3. force stages update velocities
//! 4. positions are integrated and kept inside the world bounds
//! 5. touching pairs exchange collision impulses
//! 6. particles are pushed out of obstacles, then re-contained
//!
//! Each phase borrows only the particle fields it needs.

use crate::collision;
use crate::density;
use crate::emitter::{Emitter, EmitterState};
use crate::error::{ConfigError, SpawnError};
use crate::forces::{self, ForceContext, ForceStage};
use crate::integrate;
use crate::obstacle::{self, Obstacle};
use crate::params::SimulationParams;
use crate::particle::ParticleSnapshot;
use crate::spatial::{AllPairs, NeighborQuery};
use crate::spawn::{SpawnContext, SpawnRegion};
use crate::store::ParticleStore;
use crate::time::SimTime;
use glam::Vec3;
use log::{debug, info, warn};

/// Particle fluid simulation.
///
/// Built with [`Simulation::new`] and configured by method chaining:
///
/// ```
/// use spindrift::{Obstacle, Simulation, SimulationParams, SpawnRegion, UniformGrid, Vec3};
///
/// let params = SimulationParams::default();
/// let cell = params.kernel_radius;
/// let mut sim = Simulation::new(500, params)
///     .unwrap()
///     .with_neighbor_query(UniformGrid::new(cell));
///
/// sim.fill(&SpawnRegion::Box { min: Vec3::splat(-0.3), max: Vec3::splat(0.3) }, 500, 1.0, true)
///     .unwrap();
/// sim.set_obstacles(&[Obstacle::new(Vec3::new(0.0, -0.8, 0.0), Vec3::new(0.3, 0.05, 0.3))]);
///
/// for _ in 0..10 {
///     sim.tick();
/// }
/// assert!(sim.snapshot().iter().all(|p| p.position().abs().max_element() <= 1.0));
/// ```
pub struct Simulation<N: NeighborQuery = AllPairs> {
    params: SimulationParams,
    store: ParticleStore,
    query: N,
    stages: Vec<ForceStage>,
    emitters: Vec<EmitterState>,
    obstacles: Vec<Obstacle>,
    spawn: SpawnContext,
    time: SimTime,
    scratch: Vec<Vec3>,
}

impl Simulation<AllPairs> {
    /// Create a simulation with `capacity` empty slots and no obstacles.
    ///
    /// Fails if the capacity is zero or any parameter is invalid.
    pub fn new(capacity: usize, params: SimulationParams) -> Result<Self, ConfigError> {
        Self::create(capacity, params, &[])
    }

    /// Create a simulation with an initial obstacle snapshot.
    pub fn create(capacity: usize, params: SimulationParams, obstacles: &[Obstacle]) -> Result<Self, ConfigError> {
        params.validate()?;
        let store = ParticleStore::new(capacity)?;

        info!(
            "simulation created: {} slots, {:?}, {} obstacles, {} neighbor search",
            capacity,
            params.bounds,
            obstacles.len(),
            AllPairs.name()
        );

        Ok(Self {
            spawn: SpawnContext::new(params.seed),
            params,
            store,
            query: AllPairs,
            stages: ForceStage::DEFAULT_ORDER.to_vec(),
            emitters: Vec::new(),
            obstacles: obstacles.to_vec(),
            time: SimTime::new(),
            scratch: Vec::with_capacity(capacity),
        })
    }
}

impl<N: NeighborQuery> Simulation<N> {
    /// Replace the neighbor search strategy.
    pub fn with_neighbor_query<M: NeighborQuery>(self, query: M) -> Simulation<M> {
        debug!("neighbor query: {} -> {}", self.query.name(), query.name());
        Simulation {
            params: self.params,
            store: self.store,
            query,
            stages: self.stages,
            emitters: self.emitters,
            obstacles: self.obstacles,
            spawn: self.spawn,
            time: self.time,
            scratch: self.scratch,
        }
    }

    /// Replace the force pipeline. Stages run in the given order; a stage may
    /// appear more than once or not at all.
    pub fn with_force_stages(mut self, stages: impl IntoIterator<Item = ForceStage>) -> Self {
        self.stages = stages.into_iter().collect();
        self
    }

    /// Add an emitter.
    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitters.push(EmitterState::new(emitter));
        self
    }

    /// Install an initial obstacle snapshot.
    pub fn with_obstacles(mut self, obstacles: &[Obstacle]) -> Self {
        self.set_obstacles(obstacles);
        self
    }

    /// Spawn one active particle.
    ///
    /// On failure nothing changes.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3, mass: f32) -> Result<usize, SpawnError> {
        self.store.spawn(position, velocity, mass).map_err(|e| {
            if let SpawnError::CapacityExceeded { capacity } = e {
                warn!("spawn rejected: all {} slots active", capacity);
            }
            e
        })
    }

    /// Place `count` particles in `region`, at rest.
    ///
    /// With `active = false` the particles stay dormant until an emitter
    /// releases them. All-or-nothing: if the free slots cannot hold the whole
    /// batch, nothing is placed. Returns the number placed.
    pub fn fill(&mut self, region: &SpawnRegion, count: usize, mass: f32, active: bool) -> Result<usize, SpawnError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SpawnError::InvalidMass(mass));
        }
        let free = self.store.capacity() - self.store.len();
        if count > free {
            warn!("fill rejected: {} particles requested, {} slots free", count, free);
            return Err(SpawnError::CapacityExceeded {
                capacity: self.store.capacity(),
            });
        }

        for i in 0..count {
            let position = region.sample(i, &mut self.spawn);
            if active {
                self.store.spawn(position, Vec3::ZERO, mass)?;
            } else {
                self.store.place(position, mass)?;
            }
        }
        debug!("placed {} {} particles", count, if active { "active" } else { "dormant" });
        Ok(count)
    }

    /// Deactivate a particle. Its slot becomes reusable.
    pub fn deactivate(&mut self, index: usize) -> bool {
        self.store.deactivate(index)
    }

    /// Replace the obstacle snapshot. Takes effect on the next step.
    pub fn set_obstacles(&mut self, obstacles: &[Obstacle]) {
        self.obstacles.clear();
        self.obstacles.extend_from_slice(obstacles);
    }

    /// Advance by `dt` seconds, scaled by the clock, against the stored
    /// obstacle snapshot.
    ///
    /// Non-positive or non-finite `dt` is ignored, as is any step while the
    /// clock is paused.
    pub fn step(&mut self, dt: f32) {
        let obstacles = std::mem::take(&mut self.obstacles);
        self.step_with_obstacles(dt, &obstacles);
        self.obstacles = obstacles;
    }

    /// Advance by the configured `delta_time`.
    pub fn tick(&mut self) {
        self.step(self.params.delta_time);
    }

    /// Advance by `dt` against obstacles borrowed for this call only. The
    /// stored snapshot is left untouched.
    pub fn step_with_obstacles(&mut self, dt: f32, obstacles: &[Obstacle]) {
        if !dt.is_finite() || dt <= 0.0 {
            debug!("ignoring step with dt = {}", dt);
            return;
        }
        let dt = self.time.advance(dt);
        if dt <= 0.0 {
            return;
        }

        for emitter in &mut self.emitters {
            emitter.advance(dt, &mut self.store, &mut self.spawn);
        }

        self.query.rebuild(self.store.positions(), self.store.active());

        let params = &self.params;
        let fields = self.store.fields_mut();

        // Density
        density::evaluate(
            &self.query,
            params,
            fields.positions,
            fields.masses,
            fields.active,
            fields.densities,
            fields.pressures,
        );

        // Forces
        let ctx = ForceContext {
            query: &self.query,
            params,
            dt,
            positions: fields.positions,
            masses: fields.masses,
            active: fields.active,
        };
        for &stage in &self.stages {
            forces::apply_stage(stage, &ctx, fields.velocities, &mut self.scratch);
        }

        // Integration
        integrate::integrate(fields.positions, fields.velocities, fields.active, dt);
        integrate::contain(
            &params.bounds,
            params.wall_damping,
            fields.positions,
            fields.velocities,
            fields.active,
        );

        // Collisions
        self.query.rebuild(fields.positions, fields.active);
        collision::resolve_pairs(
            &self.query,
            params.contact_distance(),
            params.restitution,
            fields.positions,
            fields.velocities,
            fields.masses,
            fields.active,
        );

        if !obstacles.is_empty() {
            obstacle::resolve_all(
                obstacles,
                &params.bounds,
                params.particle_radius,
                params.obstacle_restitution,
                fields.positions,
                fields.velocities,
                fields.active,
            );
            // Catches obstacles that leave no in-world face
            integrate::contain(
                &params.bounds,
                params.wall_damping,
                fields.positions,
                fields.velocities,
                fields.active,
            );
        }
    }

    /// Per-slot state for a renderer, one entry per allocated slot.
    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        let mut out = Vec::with_capacity(self.store.len());
        self.snapshot_into(&mut out);
        out
    }

    /// Like [`snapshot`](Self::snapshot), reusing `out`'s allocation.
    pub fn snapshot_into(&self, out: &mut Vec<ParticleSnapshot>) {
        out.clear();
        let len = self.store.len();
        out.extend((0..len).map(|i| {
            ParticleSnapshot::new(
                self.store.positions()[i],
                self.store.velocities()[i],
                self.store.active()[i],
                self.store.densities()[i],
            )
        }));
    }

    /// Total kinetic energy of active particles.
    pub fn kinetic_energy(&self) -> f32 {
        let mut energy = 0.0;
        self.store.for_each_active(|i| {
            energy += 0.5 * self.store.masses()[i] * self.store.velocities()[i].length_squared();
        });
        energy
    }

    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    #[inline]
    pub fn neighbor_query(&self) -> &N {
        &self.query
    }

    #[inline]
    pub fn force_stages(&self) -> &[ForceStage] {
        &self.stages
    }

    #[inline]
    pub fn emitters(&self) -> &[EmitterState] {
        &self.emitters
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn time(&self) -> &SimTime {
        &self.time
    }

    /// Clock control: pause, resume, time scale.
    #[inline]
    pub fn time_mut(&mut self) -> &mut SimTime {
        &mut self.time
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Allocated slots, active or dormant.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    /// Density of slot `index` from the last step, if the slot exists.
    pub fn density(&self, index: usize) -> Option<f32> {
        self.store.densities()[..self.store.len()].get(index).copied()
    }

    /// Pressure of slot `index` from the last step, if the slot exists.
    pub fn pressure(&self, index: usize) -> Option<f32> {
        self.store.pressures()[..self.store.len()].get(index).copied()
    }
}
