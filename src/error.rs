//! Error types for Spindrift.
//!
//! Configuration problems are caught when a simulation is built. Once a
//! simulation exists, stepping it cannot fail; the only recoverable runtime
//! error is asking for a particle slot that does not exist.

use thiserror::Error;

/// Errors raised while validating parameters or building a simulation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The particle store must hold at least one slot.
    #[error("Particle store capacity must be greater than zero")]
    ZeroCapacity,
    /// A parameter that must be strictly positive was not.
    #[error("Parameter `{name}` must be positive, got {value}")]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A parameter that must not be negative was.
    #[error("Parameter `{name}` must not be negative, got {value}")]
    Negative {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A parameter was NaN or infinite.
    #[error("Parameter `{name}` must be finite")]
    NonFinite {
        /// Parameter name.
        name: &'static str,
    },
    /// A JSON configuration document could not be read or written.
    #[error("Failed to parse simulation config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when placing a particle into the store.
///
/// A failed call leaves the store untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SpawnError {
    /// Every slot is occupied by an active particle.
    #[error("No inactive particle slot left (capacity {capacity})")]
    CapacityExceeded {
        /// Store capacity.
        capacity: usize,
    },
    /// Particle mass must be positive and finite.
    #[error("Particle mass must be positive and finite, got {0}")]
    InvalidMass(f32),
}

/// Errors raised while loading, saving or building a scene document.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The scene file could not be read or written.
    #[error("Failed to access scene file: {0}")]
    Io(#[from] std::io::Error),
    /// The scene's parameters or JSON were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A spawn batch did not fit.
    #[error("Failed to place scene particles: {0}")]
    Spawn(#[from] SpawnError),
}
