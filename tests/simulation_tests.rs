//! End-to-end behaviour of a running simulation.

use spindrift::collision;
use spindrift::kernel::Poly6;
use spindrift::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

/// No gravity, no pairwise heuristics.
fn inert_params() -> SimulationParams {
    SimulationParams::default()
        .with_gravity(Vec3::ZERO)
        .with_coefficients(0.0, 0.0, 0.0, 0.0)
}

fn assert_contained<N: NeighborQuery>(sim: &Simulation<N>) {
    let bounds = sim.params().bounds;
    for (i, p) in sim.snapshot().iter().enumerate() {
        if p.is_active() {
            assert!(bounds.contains(p.position()), "particle {} escaped: {:?}", i, p.position());
        }
    }
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_box_bounds_hold_over_many_ticks() {
    let params = SimulationParams::default()
        .with_bounds(Bounds::Box {
            half_extents: Vec3::new(0.4, 0.3, 0.2),
            floor: FloorMode::Clamp,
        })
        .with_gravity(Vec3::new(3.0, -20.0, 1.0))
        .with_seed(5);
    let mut sim = Simulation::new(300, params).unwrap();
    sim.fill(
        &SpawnRegion::Box {
            min: Vec3::new(-0.4, -0.3, -0.2),
            max: Vec3::new(0.4, 0.3, 0.2),
        },
        300,
        1.0,
        true,
    )
    .unwrap();

    for _ in 0..120 {
        sim.tick();
        assert_contained(&sim);
    }
}

#[test]
fn test_cylinder_bounds_hold_with_obstacles() {
    let params = SimulationParams::default()
        .with_bounds(Bounds::cylinder(0.3, 0.5))
        .with_obstacle_restitution(1.5)
        .with_seed(9);
    let obstacles = [
        Obstacle::new(Vec3::new(0.25, -0.4, 0.0), Vec3::new(0.2, 0.05, 0.2)),
        Obstacle::new(Vec3::new(-0.2, 0.0, 0.1), Vec3::splat(0.1)),
    ];
    let mut sim = Simulation::create(200, params, &obstacles)
        .unwrap()
        .with_neighbor_query(UniformGrid::new(0.08));
    sim.fill(
        &SpawnRegion::Cylinder {
            center: Vec3::ZERO,
            radius: 0.3,
            half_height: 0.5,
        },
        200,
        1.0,
        true,
    )
    .unwrap();

    for _ in 0..120 {
        sim.tick();
        assert_contained(&sim);
    }
}

#[test]
fn test_reset_floor_returns_particles_to_middle() {
    let params = inert_params()
        .with_gravity(Vec3::new(0.0, -9.8, 0.0))
        .with_bounds(Bounds::cube(0.5).with_floor(FloorMode::Reset));
    let mut sim = Simulation::new(1, params).unwrap();
    sim.spawn(Vec3::new(0.1, -0.49, 0.0), Vec3::new(0.0, -3.0, 0.0), 1.0).unwrap();

    sim.tick();
    let p = sim.snapshot()[0];
    assert_eq!(p.position().y, 0.0);
    assert!(p.velocity().y > 0.0);
}

// ============================================================================
// Particle/particle collisions
// ============================================================================

#[test]
fn test_head_on_collision_is_symmetric() {
    let r = 0.05;
    let eps = 1e-3;
    let restitution = 0.8;
    let positions = [Vec3::ZERO, Vec3::new(2.0 * r - eps, 0.0, 0.0)];
    let before = [Vec3::new(0.7, 0.0, 0.0), Vec3::new(-0.7, 0.0, 0.0)];
    let mut velocities = before;

    let contacts = collision::resolve_pairs(
        &AllPairs,
        2.0 * r,
        restitution,
        &positions,
        &mut velocities,
        &[2.0, 2.0],
        &[true, true],
    );
    assert_eq!(contacts, 1);

    // Swapped and scaled by restitution
    assert!((velocities[0] - before[1] * restitution).length() < 1e-6);
    assert!((velocities[1] - before[0] * restitution).length() < 1e-6);

    // Equal and opposite impulses
    let impulse_i = (velocities[0] - before[0]) * 2.0;
    let impulse_j = (velocities[1] - before[1]) * 2.0;
    assert_eq!(impulse_i, -impulse_j);
}

#[test]
fn test_two_particle_scenario() {
    let params = inert_params()
        .with_particle_radius(1.0)
        .with_kernel_radius(4.0)
        .with_restitution(0.5)
        .with_bounds(Bounds::cube(10.0));
    let mut sim = Simulation::new(2, params).unwrap().with_force_stages(Vec::<ForceStage>::new());
    sim.spawn(Vec3::ZERO, Vec3::X, 1.0).unwrap();
    sim.spawn(Vec3::new(1.5, 0.0, 0.0), -Vec3::X, 1.0).unwrap();

    sim.tick();
    let snap = sim.snapshot();
    assert_eq!(snap[0].velocity(), Vec3::new(-0.5, 0.0, 0.0));
    assert_eq!(snap[1].velocity(), Vec3::new(0.5, 0.0, 0.0));

    // Now separating: the impulse is not applied again
    sim.tick();
    let snap = sim.snapshot();
    assert_eq!(snap[0].velocity(), Vec3::new(-0.5, 0.0, 0.0));
    assert_eq!(snap[1].velocity(), Vec3::new(0.5, 0.0, 0.0));
    let along = (snap[1].velocity() - snap[0].velocity()).dot(Vec3::X);
    assert!(along > 0.0);
}

// ============================================================================
// Density
// ============================================================================

#[test]
fn test_calibrated_lattice_has_zero_pressure() {
    let h = 0.1;
    let spacing = 0.05;
    let rest_density = 1000.0;

    // Kernel sum over the lattice neighbours of one interior site
    let kernel = Poly6::new(h);
    let mut sum = 0.0;
    for x in -3i32..=3 {
        for y in -3i32..=3 {
            for z in -3i32..=3 {
                if (x, y, z) != (0, 0, 0) {
                    let offset = Vec3::new(x as f32, y as f32, z as f32) * spacing;
                    sum += kernel.eval(offset.length());
                }
            }
        }
    }
    let mass = rest_density / sum;

    let params = inert_params()
        .with_kernel_radius(h)
        .with_pressure(2.0, rest_density);
    let mut sim = Simulation::new(343, params).unwrap().with_force_stages(Vec::<ForceStage>::new());
    sim.fill(
        &SpawnRegion::Lattice {
            origin: Vec3::splat(-0.15),
            spacing,
            dims: UVec3::splat(7),
        },
        343,
        mass,
        true,
    )
    .unwrap();
    sim.tick();

    // Sites at least two spacings from every face see a full neighbourhood
    let index = |x: usize, y: usize, z: usize| x + z * 7 + y * 49;
    for x in 2..=4 {
        for y in 2..=4 {
            for z in 2..=4 {
                let i = index(x, y, z);
                let density = sim.density(i).unwrap();
                let pressure = sim.pressure(i).unwrap();
                assert!((density - rest_density).abs() < 0.5, "density {} at {}", density, i);
                assert!(pressure.abs() < 1.0, "pressure {} at {}", pressure, i);
            }
        }
    }

    // Corners are under-dense, and pressure goes negative there
    assert!(sim.pressure(0).unwrap() < 0.0);
}

// ============================================================================
// Forces
// ============================================================================

#[test]
fn test_repulsion_separates_overlap() {
    let params = SimulationParams::default().with_gravity(Vec3::ZERO);
    let r = params.particle_radius;
    let mut sim = Simulation::new(2, params).unwrap();
    sim.spawn(Vec3::ZERO, Vec3::ZERO, 1.0).unwrap();
    sim.spawn(Vec3::new(0.5 * r, 0.0, 0.0), Vec3::ZERO, 1.0).unwrap();

    let separation = |sim: &Simulation| {
        let s = sim.snapshot();
        (s[1].position() - s[0].position()).length()
    };
    let before = separation(&sim);
    sim.tick();
    assert!(separation(&sim) > before);
}

#[test]
fn test_gravity_only_free_fall() {
    let params = inert_params().with_gravity(Vec3::new(0.0, -10.0, 0.0)).with_delta_time(0.01);
    let mut sim = Simulation::new(1, params).unwrap();
    sim.spawn(Vec3::ZERO, Vec3::ZERO, 2.0).unwrap();
    sim.tick();

    // Velocity changes by g·dt/m, then the position moves by v·dt
    let p = sim.snapshot()[0];
    assert!((p.velocity().y + 0.05).abs() < 1e-6);
    assert!((p.position().y + 0.0005).abs() < 1e-7);
}

// ============================================================================
// Obstacles
// ============================================================================

#[test]
fn test_particle_inside_obstacle_is_pushed_out() {
    let params = inert_params();
    let r = params.particle_radius;
    let obstacle = Obstacle::new(Vec3::ZERO, Vec3::splat(0.2));
    let mut sim = Simulation::create(1, params, &[obstacle]).unwrap();
    sim.spawn(Vec3::new(0.05, 0.0, 0.0), Vec3::new(-0.3, 0.0, 0.0), 1.0).unwrap();

    sim.tick();
    let p = sim.snapshot()[0];
    assert!(!obstacle.contains(p.position()));
    assert!((p.position().x - (0.2 + r)).abs() < 1e-6);
    // Normal component reversed, and amplified by restitution above 1
    assert!(p.velocity().x > 0.3);
}

#[test]
fn test_obstacle_update_applies_next_step() {
    let mut sim = Simulation::new(1, inert_params()).unwrap();
    sim.spawn(Vec3::ZERO, Vec3::ZERO, 1.0).unwrap();

    sim.tick();
    assert_eq!(sim.snapshot()[0].position(), Vec3::ZERO);

    sim.set_obstacles(&[Obstacle::new(Vec3::new(0.0, -0.1, 0.0), Vec3::splat(0.15))]);
    sim.tick();
    assert!(sim.snapshot()[0].position().y > 0.05);

    sim.set_obstacles(&[]);
    let y = sim.snapshot()[0].position().y;
    sim.tick();
    assert!(sim.snapshot()[0].position().y >= y);
}

#[test]
fn test_floor_resting_obstacle_releases_particle() {
    let params = SimulationParams::default().with_bounds(Bounds::cylinder(0.6, 1.0));
    let pedestal = Obstacle::new(Vec3::new(0.0, -0.85, 0.0), Vec3::new(0.2, 0.15, 0.2));
    let mut sim = Simulation::create(1, params, &[pedestal]).unwrap();
    sim.spawn(Vec3::new(0.05, -0.97, 0.0), Vec3::ZERO, 1.0).unwrap();

    for _ in 0..3 {
        sim.tick();
        let p = sim.snapshot()[0].position();
        assert!(!pedestal.contains(p), "stuck inside pedestal at {:?}", p);
        assert!(p.y >= -1.0);
    }
    assert_contained(&sim);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_staged_release() {
    let params = inert_params().with_delta_time(0.05);
    let mut sim = Simulation::new(20, params).unwrap().with_emitter(Emitter::Interval {
        interval: 0.1,
        count: 5,
        velocity: Vec3::new(0.0, -1.0, 0.0),
    });
    sim.fill(
        &SpawnRegion::Box {
            min: Vec3::new(-0.5, 0.5, -0.5),
            max: Vec3::new(0.5, 0.9, 0.5),
        },
        20,
        1.0,
        false,
    )
    .unwrap();

    let mut counts = Vec::new();
    for _ in 0..14 {
        sim.tick();
        counts.push(sim.active_count());
    }
    assert_eq!(counts[0], 0);
    assert!(counts.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*counts.last().unwrap(), 5);
    assert!(sim.emitters()[0].is_done());

    // Released particles start with the emitter velocity and then move
    assert!(sim.snapshot()[0].velocity().y < 0.0);
}

#[test]
fn test_runs_are_reproducible() {
    let run = || {
        let params = SimulationParams::default().with_seed(42);
        let mut sim = Simulation::new(100, params).unwrap().with_emitter(Emitter::Trickle {
            probability: 0.05,
            velocity: Vec3::new(0.0, -0.5, 0.0),
        });
        sim.fill(
            &SpawnRegion::Box {
                min: Vec3::splat(-0.5),
                max: Vec3::splat(0.5),
            },
            100,
            1.0,
            false,
        )
        .unwrap();
        for _ in 0..30 {
            sim.tick();
        }
        sim.snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_config_from_json_drives_simulation() {
    let params = SimulationParams::from_json(
        r#"{
            "particle_radius": 0.03,
            "bounds": { "Cylinder": { "radius": 0.4, "half_height": 0.6 } },
            "gravity": [0.0, -5.0, 0.0]
        }"#,
    )
    .unwrap();
    assert_eq!(params.bounds, Bounds::cylinder(0.4, 0.6));

    let mut sim = Simulation::new(10, params).unwrap();
    sim.spawn(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), 1.0).unwrap();
    for _ in 0..30 {
        sim.tick();
    }
    assert_contained(&sim);
}
