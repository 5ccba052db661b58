//! Simulation clock.
//!
//! The clock is advanced by the simulation itself, not by the wall clock, so a
//! run is fully reproducible. The host decides how much time each step covers;
//! [`SimTime`] turns that into the time the particles actually see.
//!
//! ```
//! use spindrift::time::SimTime;
//!
//! let mut time = SimTime::new();
//! time.set_time_scale(0.5);
//! assert_eq!(time.advance(0.1), 0.05);
//!
//! time.pause();
//! assert_eq!(time.advance(0.1), 0.0);
//! assert_eq!(time.frame(), 1);
//! ```

/// Elapsed time, frame counter, pause and time scale.
#[derive(Clone, Debug, PartialEq)]
pub struct SimTime {
    elapsed: f64,
    delta: f32,
    frame: u64,
    paused: bool,
    time_scale: f32,
}

impl SimTime {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Advance by a host time step and return the scaled step to simulate.
    ///
    /// Returns `0.0` and leaves the frame counter alone while paused.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }
        self.delta = dt * self.time_scale;
        self.elapsed += self.delta as f64;
        self.frame += 1;
        self.delta
    }

    /// Simulated seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Length of the last simulated step.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Number of steps simulated.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = slow motion
    ///
    /// Negative or non-finite values clamp to `0.0`.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Back to zero, unpaused. The time scale is kept.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.delta = 0.0;
        self.frame = 0;
        self.paused = false;
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::new()
    }
}
