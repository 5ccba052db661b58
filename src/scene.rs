//! Scene documents.
//!
//! A [`SceneConfig`] holds everything needed to rebuild a simulation:
//! parameters, force pipeline, obstacles, emitters and the particle batches
//! placed up front. Scenes round-trip through JSON; every field except
//! `capacity` may be left out.
//!
//! ```
//! use spindrift::scene::SceneConfig;
//!
//! let scene = SceneConfig::from_json(
//!     r#"{
//!         "capacity": 64,
//!         "spawn": [
//!             { "region": { "Sphere": { "center": [0.0, 0.5, 0.0], "radius": 0.2 } }, "count": 64 }
//!         ]
//!     }"#,
//! )
//! .unwrap();
//! let sim = scene.build().unwrap();
//! assert_eq!(sim.active_count(), 64);
//! ```

use crate::emitter::Emitter;
use crate::error::{ConfigError, SceneError};
use crate::forces::ForceStage;
use crate::obstacle::Obstacle;
use crate::params::SimulationParams;
use crate::simulation::Simulation;
use crate::spawn::SpawnRegion;
use glam::Vec3;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_name() -> String {
    "Untitled".into()
}

fn default_stages() -> Vec<ForceStage> {
    ForceStage::DEFAULT_ORDER.to_vec()
}

fn default_mass() -> f32 {
    1.0
}

fn default_active() -> bool {
    true
}

/// A batch of particles placed when the scene is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBatch {
    pub region: SpawnRegion,
    pub count: usize,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Dormant batches wait for an emitter.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Complete scene description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Particle store capacity.
    pub capacity: usize,
    #[serde(default)]
    pub params: SimulationParams,
    #[serde(default = "default_stages")]
    pub force_stages: Vec<ForceStage>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub emitters: Vec<Emitter>,
    /// Batches placed in order.
    #[serde(default)]
    pub spawn: Vec<SpawnBatch>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            capacity: 400,
            params: SimulationParams::default(),
            force_stages: default_stages(),
            obstacles: Vec::new(),
            emitters: Vec::new(),
            spawn: vec![SpawnBatch {
                region: SpawnRegion::Box {
                    min: Vec3::splat(-0.3),
                    max: Vec3::splat(0.3),
                },
                count: 400,
                mass: default_mass(),
                active: true,
            }],
        }
    }
}

impl SceneConfig {
    /// Parse a scene and validate its parameters.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_json::from_str(json)?;
        if scene.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        scene.params.validate()?;
        Ok(scene)
    }

    /// Serialize the scene as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Save the scene to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Build a simulation and place every spawn batch.
    pub fn build(&self) -> Result<Simulation, SceneError> {
        let mut sim = Simulation::create(self.capacity, self.params.clone(), &self.obstacles)?
            .with_force_stages(self.force_stages.iter().copied());
        for emitter in &self.emitters {
            sim = sim.with_emitter(emitter.clone());
        }
        for batch in &self.spawn {
            sim.fill(&batch.region, batch.count, batch.mass, batch.active)?;
        }
        info!(
            "scene `{}` built: {} particles placed, {} emitters",
            self.name,
            sim.len(),
            self.emitters.len()
        );
        Ok(sim)
    }
}
