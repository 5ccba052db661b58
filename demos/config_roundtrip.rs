//! # Config round trip
//!
//! Loads a scene from a JSON file (or prints the default scene when no path
//! is given), builds it and runs a short headless simulation.
//!
//! Run with: `cargo run --example config_roundtrip -- scene.json`

use spindrift::prelude::*;

fn main() {
    env_logger::init();

    let scene = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::load(&path) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("cannot load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            let scene = SceneConfig::default();
            match scene.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("cannot serialize defaults: {}", e),
            }
            scene
        }
    };

    let mut sim = match scene.build() {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("cannot build scene `{}`: {}", scene.name, e);
            std::process::exit(1);
        }
    };

    for _ in 0..120 {
        sim.tick();
    }
    println!(
        "`{}` after {} ticks: energy {:.4}, first density {:.1}",
        scene.name,
        sim.time().frame(),
        sim.kinetic_energy(),
        sim.density(0).unwrap_or(0.0)
    );
}
