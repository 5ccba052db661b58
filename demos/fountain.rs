//! # Fountain
//!
//! Dormant particles are parked in a ball above a cylindrical basin and
//! sprayed downward one at a time onto a pedestal standing on the floor. Prints a line of stats every
//! second of simulated time.
//!
//! Run with: `RUST_LOG=debug cargo run --example fountain --release`

use spindrift::prelude::*;

fn main() {
    env_logger::init();

    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(800);

    let params = SimulationParams::default()
        .with_bounds(Bounds::cylinder(0.6, 1.0))
        .with_particle_radius(0.02)
        .with_kernel_radius(0.08);
    let cell = params.kernel_radius;

    let pedestal = Obstacle::from_min_max(Vec3::new(-0.2, -1.0, -0.2), Vec3::new(0.2, -0.7, 0.2));

    let mut sim = match Simulation::create(count, params, &[pedestal]) {
        Ok(sim) => sim
            .with_neighbor_query(UniformGrid::new(cell))
            .with_emitter(Emitter::Spray {
                interval: 0.005,
                count: count as u32,
                velocity: Vec3::new(0.0, -1.5, 0.0),
                spread: 0.35,
            }),
        Err(e) => {
            eprintln!("bad configuration: {}", e);
            std::process::exit(1);
        }
    };

    let region = SpawnRegion::Sphere {
        center: Vec3::new(0.0, 0.8, 0.0),
        radius: 0.15,
    };
    if let Err(e) = sim.fill(&region, count, 1.0, false) {
        eprintln!("could not place particles: {}", e);
        std::process::exit(1);
    }

    println!("=== Fountain ===");
    println!("Particles: {}", count);
    println!();

    for frame in 0..600u32 {
        sim.tick();
        if frame % 60 == 59 {
            let snapshot = sim.snapshot();
            let active: Vec<_> = snapshot.iter().filter(|p| p.is_active()).collect();
            let mean_height = active.iter().map(|p| p.position().y).sum::<f32>() / active.len().max(1) as f32;
            println!(
                "t={:5.2}s  active={:5}  mean y={:+.3}  energy={:.4}",
                sim.time().elapsed(),
                active.len(),
                mean_height,
                sim.kinetic_energy()
            );
        }
    }
}
