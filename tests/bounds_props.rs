//! Property tests: no active particle ever leaves the world.

use proptest::prelude::*;
use spindrift::prelude::*;

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    let floor = prop_oneof![Just(FloorMode::Clamp), Just(FloorMode::Reset)];
    prop_oneof![
        (0.2f32..1.5, 0.2f32..1.5, 0.2f32..1.5, floor.clone()).prop_map(|(x, y, z, floor)| Bounds::Box {
            half_extents: Vec3::new(x, y, z),
            floor,
        }),
        (0.2f32..1.5, 0.2f32..1.5, floor).prop_map(|(radius, half_height, floor)| Bounds::Cylinder {
            radius,
            half_height,
            floor,
        }),
    ]
}

fn params_strategy() -> impl Strategy<Value = SimulationParams> {
    (
        bounds_strategy(),
        0.005f32..0.05,
        (-30.0f32..30.0, -30.0f32..30.0, -30.0f32..30.0),
        0.0f32..1.0,
        0.0f32..2.0,
        any::<u64>(),
    )
        .prop_map(|(bounds, radius, (gx, gy, gz), restitution, obstacle_restitution, seed)| {
            SimulationParams::default()
                .with_bounds(bounds)
                .with_particle_radius(radius)
                .with_kernel_radius(radius * 4.0)
                .with_gravity(Vec3::new(gx, gy, gz))
                .with_restitution(restitution)
                .with_obstacle_restitution(obstacle_restitution)
                .with_seed(seed)
        })
}

fn spawn_region(bounds: &Bounds) -> SpawnRegion {
    match *bounds {
        Bounds::Box { half_extents, .. } => SpawnRegion::Box {
            min: -half_extents,
            max: half_extents,
        },
        Bounds::Cylinder {
            radius, half_height, ..
        } => SpawnRegion::Cylinder {
            center: Vec3::ZERO,
            radius,
            half_height,
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_particles_stay_in_bounds(
        params in params_strategy(),
        count in 1usize..60,
        dt in 0.001f32..0.05,
        obstacle_center in (-0.5f32..0.5, -0.5f32..0.5, -0.5f32..0.5),
        obstacle_half in 0.05f32..0.4,
        use_grid in any::<bool>(),
    ) {
        let bounds = params.bounds;
        let obstacle = Obstacle::new(
            Vec3::new(obstacle_center.0, obstacle_center.1, obstacle_center.2),
            Vec3::splat(obstacle_half),
        );
        let cell = params.kernel_radius;

        let mut sim = Simulation::create(count, params, &[obstacle]).unwrap();
        sim.fill(&spawn_region(&bounds), count, 1.0, true).unwrap();

        let check = |snapshot: Vec<ParticleSnapshot>| -> Result<(), TestCaseError> {
            for p in snapshot.iter().filter(|p| p.is_active()) {
                prop_assert!(bounds.contains(p.position()), "{:?} outside {:?}", p.position(), bounds);
                prop_assert!(p.velocity().is_finite());
            }
            Ok(())
        };

        if use_grid {
            let mut sim = sim.with_neighbor_query(UniformGrid::new(cell));
            for _ in 0..40 {
                sim.step(dt);
                check(sim.snapshot())?;
            }
        } else {
            for _ in 0..40 {
                sim.step(dt);
                check(sim.snapshot())?;
            }
        }
    }

    #[test]
    fn prop_density_never_negative(
        count in 2usize..40,
        seed in any::<u64>(),
    ) {
        let params = SimulationParams::default().with_seed(seed);
        let mut sim = Simulation::new(count, params).unwrap();
        sim.fill(
            &SpawnRegion::Box { min: Vec3::splat(-0.2), max: Vec3::splat(0.2) },
            count,
            1.0,
            true,
        )
        .unwrap();
        sim.tick();
        for i in 0..count {
            prop_assert!(sim.density(i).unwrap() >= 0.0);
        }
    }
}
