//! Staged particle release.
//!
//! Emitters never create particles. They wake dormant ones that were placed
//! up front (see [`Simulation::fill`](crate::Simulation::fill) with
//! `active = false`), giving each an initial velocity.
//!
//! # Emitter Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Emitter::Interval`] | One particle every `interval` seconds until `count` are out |
//! | [`Emitter::Spray`] | Like `Interval`, with each velocity tilted randomly inside a cone |
//! | [`Emitter::Trickle`] | Each dormant particle wakes with a fixed chance per step |
//!
//! Dormant particles are released lowest slot first.
//!
//! # Example
//!
//! ```
//! use spindrift::{Emitter, Simulation, SimulationParams, SpawnRegion, Vec3};
//!
//! let params = SimulationParams::default().with_delta_time(0.1);
//! let mut sim = Simulation::new(10, params)
//!     .unwrap()
//!     .with_emitter(Emitter::Interval {
//!         interval: 0.1,
//!         count: 10,
//!         velocity: Vec3::new(0.0, -0.5, 0.0),
//!     });
//! sim.fill(&SpawnRegion::Box { min: Vec3::splat(-0.5), max: Vec3::splat(0.5) }, 10, 1.0, false)
//!     .unwrap();
//!
//! sim.tick();
//! sim.tick();
//! assert_eq!(sim.active_count(), 2);
//! ```

use crate::spawn::SpawnContext;
use crate::store::ParticleStore;
use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

/// How dormant particles are released.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Emitter {
    /// Release one particle every `interval` seconds of simulated time until
    /// `count` have been released.
    ///
    /// A non-positive interval releases the whole `count` on the first step.
    Interval {
        /// Seconds between releases.
        interval: f32,
        /// Total number of particles to release.
        count: u32,
        /// Initial velocity of released particles.
        velocity: Vec3,
    },

    /// Release like [`Emitter::Interval`], but tilt each particle's velocity
    /// by a random angle of up to `spread` radians around `velocity`. The
    /// speed is kept.
    Spray {
        /// Seconds between releases.
        interval: f32,
        /// Total number of particles to release.
        count: u32,
        /// Central velocity of the spray.
        velocity: Vec3,
        /// Cone half-angle in radians (0 = straight jet).
        spread: f32,
    },

    /// Every step, each dormant particle wakes with `probability`.
    ///
    /// The chance is per step, not per second, and runs until no dormant
    /// particle is left.
    Trickle {
        /// Chance per particle per step, clamped to `[0, 1]`.
        probability: f32,
        /// Initial velocity of released particles.
        velocity: Vec3,
    },
}

/// An [`Emitter`] together with its progress.
#[derive(Clone, Debug)]
pub struct EmitterState {
    emitter: Emitter,
    /// Simulated time not yet spent on a release.
    pending: f32,
    released: u32,
    done: bool,
}

impl EmitterState {
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            pending: 0.0,
            released: 0,
            done: false,
        }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Particles released so far.
    pub fn released(&self) -> u32 {
        self.released
    }

    /// Whether the emitter will never release anything again.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Release particles for a step of `dt` seconds.
    ///
    /// Returns the number of particles activated.
    pub fn advance(&mut self, dt: f32, store: &mut ParticleStore, ctx: &mut SpawnContext) -> usize {
        if self.done {
            return 0;
        }
        match self.emitter {
            Emitter::Interval {
                interval,
                count,
                velocity,
            } => self.advance_interval(dt, interval, count, velocity, 0.0, store, ctx),
            Emitter::Spray {
                interval,
                count,
                velocity,
                spread,
            } => self.advance_interval(dt, interval, count, velocity, spread, store, ctx),
            Emitter::Trickle {
                probability,
                velocity,
            } => self.advance_trickle(probability, velocity, store, ctx),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn advance_interval(
        &mut self,
        dt: f32,
        interval: f32,
        count: u32,
        velocity: Vec3,
        spread: f32,
        store: &mut ParticleStore,
        ctx: &mut SpawnContext,
    ) -> usize {
        let due = if interval > 0.0 {
            self.pending += dt;
            let ticks = (self.pending / interval).floor();
            self.pending -= ticks * interval;
            ticks as u32
        } else {
            count
        };

        let mut activated = 0;
        for _ in 0..due.min(count - self.released) {
            let Some(index) = store.dormant_indices().next() else {
                debug!("interval emitter: dormant pool exhausted after {} releases", self.released);
                self.done = true;
                return activated;
            };
            let launch = if spread > 0.0 {
                ctx.random_in_cone(velocity, spread) * velocity.length()
            } else {
                velocity
            };
            store.activate(index, launch);
            self.released += 1;
            activated += 1;
        }

        if self.released >= count {
            debug!("interval emitter finished: {} particles released", self.released);
            self.done = true;
        }
        activated
    }

    fn advance_trickle(&mut self, probability: f32, velocity: Vec3, store: &mut ParticleStore, ctx: &mut SpawnContext) -> usize {
        let probability = probability.clamp(0.0, 1.0);
        let dormant: Vec<usize> = store.dormant_indices().collect();
        if dormant.is_empty() {
            debug!("trickle emitter finished: {} particles released", self.released);
            self.done = true;
            return 0;
        }

        let mut activated = 0;
        for index in dormant {
            if ctx.random() < probability {
                store.activate(index, velocity);
                activated += 1;
            }
        }
        self.released += activated as u32;
        activated
    }
}
