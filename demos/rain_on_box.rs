//! # Rain on a box
//!
//! A box domain with the resetting floor: drops fall through the bottom and
//! reappear mid-domain. A moving obstacle sweeps through the rain; its
//! position is handed to the simulation each frame as a borrowed snapshot.
//!
//! Run with: `cargo run --example rain_on_box --release`

use spindrift::prelude::*;

fn main() {
    env_logger::init();

    let count = 1500;
    let params = SimulationParams::default()
        .with_bounds(Bounds::cube(1.0).with_floor(FloorMode::Reset))
        .with_gravity(Vec3::new(0.0, -4.0, 0.0))
        .with_obstacle_restitution(1.2)
        .with_seed(2024);
    let cell = params.kernel_radius;

    let mut sim = match Simulation::new(count, params) {
        Ok(sim) => sim
            .with_neighbor_query(UniformGrid::new(cell))
            .with_emitter(Emitter::Trickle {
                probability: 0.01,
                velocity: Vec3::new(0.0, -0.3, 0.0),
            }),
        Err(e) => {
            eprintln!("bad configuration: {}", e);
            std::process::exit(1);
        }
    };

    let sky = SpawnRegion::Box {
        min: Vec3::new(-0.9, 0.6, -0.9),
        max: Vec3::new(0.9, 0.95, 0.9),
    };
    if let Err(e) = sim.fill(&sky, count, 1.0, false) {
        eprintln!("could not place particles: {}", e);
        std::process::exit(1);
    }

    println!("=== Rain on a box ===");

    let mut frame_buffer = Vec::new();
    let mut hits_last = 0usize;
    for frame in 0..900u32 {
        let t = frame as f32 / 60.0;
        let paddle = Obstacle::new(Vec3::new(0.6 * (t * 0.8).sin(), -0.2, 0.0), Vec3::new(0.25, 0.04, 0.25));
        sim.step_with_obstacles(1.0 / 60.0, &[paddle]);

        sim.snapshot_into(&mut frame_buffer);
        let on_paddle = frame_buffer
            .iter()
            .filter(|p| p.is_active() && (p.position() - paddle.center).abs().cmple(paddle.half_extents + 0.05).all())
            .count();
        hits_last = hits_last.max(on_paddle);

        if frame % 120 == 119 {
            println!(
                "t={:5.2}s  active={:5}  most near paddle={:3}  upload={} bytes",
                sim.time().elapsed(),
                sim.active_count(),
                hits_last,
                bytemuck::cast_slice::<ParticleSnapshot, u8>(&frame_buffer).len()
            );
            hits_last = 0;
        }
    }
}
