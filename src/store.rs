//! Fixed-capacity particle store.
//!
//! Particles live in a structure-of-arrays arena indexed by slot. Slots never
//! move, so an index handed out by [`ParticleStore::spawn`] stays valid for the
//! life of the store. Particles are never destroyed, only deactivated and
//! later reused.
//!
//! Each simulation phase borrows only the fields it needs through
//! [`ParticleStore::fields_mut`], which keeps "density is written before forces
//! read it" an explicit property of the call sites.

use crate::error::{ConfigError, SpawnError};
use glam::Vec3;

/// Split borrows of every per-particle field.
///
/// `masses` and `active` are read-only: mass is fixed at spawn and activation
/// only changes between ticks.
pub struct ParticleFields<'a> {
    pub positions: &'a mut [Vec3],
    pub velocities: &'a mut [Vec3],
    pub densities: &'a mut [f32],
    pub pressures: &'a mut [f32],
    pub masses: &'a [f32],
    pub active: &'a [bool],
}

/// Structure-of-arrays particle arena.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f32>,
    densities: Vec<f32>,
    pressures: Vec<f32>,
    active: Vec<bool>,
    /// Slots `[0, allocated)` hold particles; the rest are still vacant.
    allocated: usize,
}

impl ParticleStore {
    /// Allocate `capacity` zeroed, inactive slots.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            positions: vec![Vec3::ZERO; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            masses: vec![0.0; capacity],
            densities: vec![0.0; capacity],
            pressures: vec![0.0; capacity],
            active: vec![false; capacity],
            allocated: 0,
        })
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    /// Number of slots holding a particle, active or dormant.
    #[inline]
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// True if no particle was ever placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Number of active particles.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Spawn an active particle.
    ///
    /// Takes the next vacant slot. Once every slot has been used, the
    /// lowest-index inactive slot is recycled, which may be a dormant particle
    /// that an emitter has not released yet.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3, mass: f32) -> Result<usize, SpawnError> {
        check_mass(mass)?;
        let index = if self.allocated < self.capacity() {
            self.allocated += 1;
            self.allocated - 1
        } else {
            self.active
                .iter()
                .position(|a| !a)
                .ok_or(SpawnError::CapacityExceeded {
                    capacity: self.capacity(),
                })?
        };
        self.write_slot(index, position, velocity, mass, true);
        Ok(index)
    }

    /// Place a dormant particle at rest, to be activated later.
    ///
    /// Only vacant slots are used; dormant particles are never recycled here.
    pub fn place(&mut self, position: Vec3, mass: f32) -> Result<usize, SpawnError> {
        check_mass(mass)?;
        if self.allocated == self.capacity() {
            return Err(SpawnError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        let index = self.allocated;
        self.allocated += 1;
        self.write_slot(index, position, Vec3::ZERO, mass, false);
        Ok(index)
    }

    /// Activate a dormant particle with an initial velocity.
    ///
    /// Returns `false` if the slot is vacant or already active.
    pub fn activate(&mut self, index: usize, velocity: Vec3) -> bool {
        if index >= self.allocated || self.active[index] {
            return false;
        }
        self.active[index] = true;
        self.velocities[index] = velocity;
        true
    }

    /// Deactivate a particle. Its slot keeps its state and can be reused.
    pub fn deactivate(&mut self, index: usize) -> bool {
        if index >= self.allocated || !self.active[index] {
            return false;
        }
        self.active[index] = false;
        self.densities[index] = 0.0;
        self.pressures[index] = 0.0;
        true
    }

    /// Indices of dormant particles, lowest first.
    pub fn dormant_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.allocated).filter(move |&i| !self.active[i])
    }

    /// Call `f` for every active particle, in ascending slot order.
    pub fn for_each_active(&self, mut f: impl FnMut(usize)) {
        for (i, _) in self.active[..self.allocated]
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
        {
            f(i);
        }
    }

    /// Borrow every field separately.
    pub fn fields_mut(&mut self) -> ParticleFields<'_> {
        ParticleFields {
            positions: &mut self.positions,
            velocities: &mut self.velocities,
            densities: &mut self.densities,
            pressures: &mut self.pressures,
            masses: &self.masses,
            active: &self.active,
        }
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[inline]
    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    #[inline]
    pub fn densities(&self) -> &[f32] {
        &self.densities
    }

    #[inline]
    pub fn pressures(&self) -> &[f32] {
        &self.pressures
    }

    #[inline]
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// Whether slot `index` holds an active particle.
    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    fn write_slot(&mut self, index: usize, position: Vec3, velocity: Vec3, mass: f32, active: bool) {
        self.positions[index] = position;
        self.velocities[index] = velocity;
        self.masses[index] = mass;
        self.densities[index] = 0.0;
        self.pressures[index] = 0.0;
        self.active[index] = active;
    }
}

fn check_mass(mass: f32) -> Result<(), SpawnError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(SpawnError::InvalidMass(mass))
    }
}
