use avian2d::prelude::LayerMask;
use bevy::prelude::*;
use bevy_ray_platformer::physics::{
    slope_angle, BodyConfig, ColliderSet, CollisionResolver, CollisionState, KinematicBody,
    RayCaster, RayGrid, SurfaceKind, SweepSettings, DISTANCE_BETWEEN_RAYS, SKIN_WIDTH,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPSILON: f32 = 1e-3;

fn body() -> KinematicBody {
    KinematicBody::new(
        Vec2::splat(0.5),
        BodyConfig::default().with_collision_mask(LayerMask::ALL),
    )
    .unwrap()
}

fn resolve(world: &ColliderSet, state: &mut CollisionState, center: Vec2, velocity: Vec2) -> Vec2 {
    let grid = RayGrid::new(Vec2::splat(0.5), SKIN_WIDTH, DISTANCE_BETWEEN_RAYS).unwrap();
    let settings = SweepSettings {
        skin_width: SKIN_WIDTH,
        max_slope_angle: 80.0,
        collision_mask: LayerMask::ALL,
    };
    CollisionResolver::new(world, settings, grid.origins(center), grid.spacing(), Vec2::ZERO)
        .resolve(state, velocity)
}

#[test]
fn stops_flush_against_wall() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    world.add_box(
        entities.spawn_empty().id(),
        Vec2::new(0.0, -5.0),
        Vec2::new(50.0, 5.0),
        SurfaceKind::Solid,
        LayerMask::ALL,
    );
    // Wall face at x = 1
    world.add_box(
        entities.spawn_empty().id(),
        Vec2::new(2.0, 2.0),
        Vec2::new(1.0, 2.0),
        SurfaceKind::Solid,
        LayerMask::ALL,
    );

    let mut body = body();
    let mut position = Vec2::new(0.0, 0.5);
    let moved = body.move_and_collide(&mut position, Vec2::new(2.0, 0.0), Vec2::ZERO, false, &world);

    assert!((moved.x - 0.5).abs() < EPSILON);
    assert!((position.x + 0.5 - 1.0).abs() < EPSILON);
    assert!(body.collisions.right);
}

#[test]
fn wall_clamp_holds_for_random_gaps() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut entities = World::new();
    let floor = entities.spawn_empty().id();
    let wall = entities.spawn_empty().id();

    for _ in 0..200 {
        let gap: f32 = rng.gen_range(0.02..3.0);
        let direction: f32 = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let wall_face = direction * (0.5 + gap);

        let mut world = ColliderSet::new();
        world.add_box(floor, Vec2::new(0.0, -5.0), Vec2::new(50.0, 5.0), SurfaceKind::Solid, LayerMask::ALL);
        world.add_box(
            wall,
            Vec2::new(wall_face + direction, 2.0),
            Vec2::new(1.0, 2.0),
            SurfaceKind::Solid,
            LayerMask::ALL,
        );

        // Long enough to reach the wall
        let speed = rng.gen_range(gap + 0.01..gap + 5.0);
        let mut state = CollisionState::default();
        let velocity = resolve(&world, &mut state, Vec2::new(0.0, 0.5), Vec2::new(speed * direction, 0.0));

        assert!(
            (velocity.x - gap * direction).abs() < EPSILON,
            "gap {gap} speed {speed} direction {direction}: got {}",
            velocity.x
        );
        assert_eq!(state.right, direction > 0.0);
        assert_eq!(state.left, direction < 0.0);

        // Too short to reach it
        let speed = rng.gen_range(0.0..gap - 0.01);
        let mut state = CollisionState::default();
        let velocity = resolve(&world, &mut state, Vec2::new(0.0, 0.5), Vec2::new(speed * direction, 0.0));

        assert_eq!(velocity.x, speed * direction);
        assert!(!state.left && !state.right);
    }
}

/// Symmetric 30 degree valley with its bottom at the origin; returns the
/// angle a sweep reads off the rising right-hand side
fn valley(world: &mut ColliderSet, collider: Entity) -> f32 {
    let rise = 20.0 * 30.0_f32.to_radians().tan();
    world
        .add_polygon(
            collider,
            &[
                Vec2::new(-20.0, -5.0),
                Vec2::new(-20.0, rise),
                Vec2::ZERO,
                Vec2::new(0.0, -5.0),
            ],
            SurfaceKind::Solid,
            LayerMask::ALL,
        )
        .add_polygon(
            collider,
            &[
                Vec2::new(0.0, -5.0),
                Vec2::ZERO,
                Vec2::new(20.0, rise),
                Vec2::new(20.0, -5.0),
            ],
            SurfaceKind::Solid,
            LayerMask::ALL,
        );
    let face = world
        .cast_ray(Vec2::new(0.0, 1.0), Dir2::X, 20.0, LayerMask::ALL)
        .expect("right-hand side of the valley");
    slope_angle(face.normal)
}

#[test]
fn descend_into_climb_restores_requested_velocity() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    let angle = valley(&mut world, entities.spawn_empty().id());

    // Sitting in the bottom of the valley, still on the same slope angle as
    // last step
    let mut state = CollisionState {
        slope_angle: angle,
        ..default()
    };
    let center = Vec2::new(0.0, 0.5 + 0.5 * angle.to_radians().tan() + 0.002);
    let requested = Vec2::new(0.2, -0.01);

    let velocity = resolve(&world, &mut state, center, requested);

    let radians = angle.to_radians();
    assert_eq!(state.velocity_old, requested);
    assert!(state.climbing_slope());
    assert!(!state.descending_slope());
    assert!(state.below);
    // Climb starts from the full requested run, with no slope-start offset
    assert!((velocity.x - radians.cos() * requested.x).abs() < EPSILON);
    assert!((velocity.y - radians.sin() * requested.x).abs() < EPSILON);
}

#[test]
fn fresh_slope_climb_starts_at_slope_foot() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    world.add_box(
        entities.spawn_empty().id(),
        Vec2::new(0.0, -5.0),
        Vec2::new(50.0, 5.0),
        SurfaceKind::Solid,
        LayerMask::ALL,
    );
    let tan = 30.0_f32.to_radians().tan();
    world.add_polygon(
        entities.spawn_empty().id(),
        &[Vec2::new(1.0, 0.0), Vec2::new(21.0, 20.0 * tan), Vec2::new(21.0, 0.0)],
        SurfaceKind::Solid,
        LayerMask::ALL,
    );

    // Flat ground last step
    let mut state = CollisionState::default();
    let velocity = resolve(&world, &mut state, Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.0));

    // Lowest ray meets the ramp a skin above the floor
    let hit_distance = (1.0 + SKIN_WIDTH / tan) - (0.5 - SKIN_WIDTH);
    let flat_run = hit_distance - SKIN_WIDTH;
    let slope_run = 1.0 - flat_run;
    let radians = 30.0_f32.to_radians();

    assert!(state.climbing_slope());
    assert!((velocity.x - (flat_run + radians.cos() * slope_run)).abs() < EPSILON);
    assert!((velocity.y - radians.sin() * slope_run).abs() < EPSILON);
}

#[test]
fn walking_down_ramp_follows_its_surface() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    // 30 degree ramp falling to the right, through the origin
    let tan = 30.0_f32.to_radians().tan();
    world.add_polygon(
        entities.spawn_empty().id(),
        &[
            Vec2::new(-20.0, -15.0),
            Vec2::new(-20.0, 20.0 * tan),
            Vec2::new(20.0, -20.0 * tan),
            Vec2::new(20.0, -15.0),
        ],
        SurfaceKind::Solid,
        LayerMask::ALL,
    );

    // Uphill corner just above the surface
    let mut state = CollisionState::default();
    let center = Vec2::new(0.0, 0.5 + 0.5 * tan + 0.002);
    let requested = Vec2::new(0.2, -0.01);
    let velocity = resolve(&world, &mut state, center, requested);

    assert!(state.descending_slope());
    assert!(state.below);
    assert!((state.slope_angle - 30.0).abs() < EPSILON);
    let radians = state.slope_angle.to_radians();
    assert!((velocity.x - radians.cos() * requested.x).abs() < EPSILON);
    assert!((velocity.y - (requested.y - radians.sin() * requested.x)).abs() < EPSILON);
}

#[test]
fn foot_over_too_steep_face_slides_off_it() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    // 82 degree face rising to the right from x = 0.48, under the right foot
    // only
    let tan = 82.0_f32.to_radians().tan();
    let top_x = 0.48 + 5.0 / tan;
    world.add_polygon(
        entities.spawn_empty().id(),
        &[Vec2::new(0.48, 0.0), Vec2::new(top_x, 5.0), Vec2::new(top_x, 0.0)],
        SurfaceKind::Solid,
        LayerMask::ALL,
    );

    // Bottom ray origins at y = 0.1
    let mut state = CollisionState::default();
    let requested = Vec2::new(0.0, -0.2);
    let velocity = resolve(&world, &mut state, Vec2::new(0.0, 0.585), requested);

    let foot_x = 0.5 - SKIN_WIDTH;
    let hit_distance = 0.1 - (foot_x - 0.48) * tan;

    assert!(state.sliding_down_max_slope());
    assert!(state.slope_angle > 80.0);
    assert!(state.slope_normal.x < 0.0);
    let expected_x = -(requested.y.abs() - hit_distance) / state.slope_angle.to_radians().tan();
    assert!((velocity.x - expected_x).abs() < 1e-4, "{} vs {expected_x}", velocity.x);
    assert_eq!(velocity.y, requested.y);
}

#[test]
fn climb_onto_steeper_section_is_cut_at_the_bend() {
    let mut entities = World::new();
    let mut world = ColliderSet::new();
    // 20 degrees up to x = 0.6, then 45 degrees
    let tan = 20.0_f32.to_radians().tan();
    let bend = Vec2::new(0.6, 0.6 * tan);
    let hill = entities.spawn_empty().id();
    world
        .add_polygon(
            hill,
            &[
                Vec2::new(-5.0, -5.0),
                Vec2::new(-5.0, -5.0 * tan),
                bend,
                Vec2::new(bend.x, -5.0),
            ],
            SurfaceKind::Solid,
            LayerMask::ALL,
        )
        .add_polygon(
            hill,
            &[
                Vec2::new(bend.x, -5.0),
                bend,
                Vec2::new(5.0, bend.y + (5.0 - bend.x)),
                Vec2::new(5.0, -5.0),
            ],
            SurfaceKind::Solid,
            LayerMask::ALL,
        );

    // Leading bottom corner resting on the 20 degree section, which was
    // already underfoot last step
    let center = Vec2::new(0.0, 0.5 + 0.5 * tan);
    let corner = Vec2::new(0.5 - SKIN_WIDTH, 0.5 * tan + SKIN_WIDTH);
    let gentle = world
        .cast_ray(corner, Dir2::X, 1.0, LayerMask::ALL)
        .expect("20 degree section ahead of the corner");
    let mut state = CollisionState {
        slope_angle: slope_angle(gentle.normal),
        ..default()
    };

    let requested = Vec2::new(0.3, 0.0);
    let velocity = resolve(&world, &mut state, center, requested);

    let climb = 20.0_f32.to_radians();
    // Re-check ray starts at the raised corner and meets the 45 degree face
    let raised_y = corner.y + climb.sin() * requested.x;
    let steep_x = bend.x + (raised_y - bend.y);

    assert!(state.climbing_slope());
    assert!((state.slope_angle - 45.0).abs() < EPSILON);
    assert!((velocity.y - climb.sin() * requested.x).abs() < EPSILON);
    assert!((velocity.x - (steep_x - 0.5)).abs() < EPSILON);
    assert!(velocity.x < climb.cos() * requested.x);
}

#[test]
fn drop_through_one_way_then_land_on_it_again() {
    let mut entities = World::new();
    let ledge = entities.spawn_empty().id();
    let floor = entities.spawn_empty().id();

    let mut world = ColliderSet::new();
    // One-way ledge top at y = 0, solid floor top at y = -5
    world.add_box(ledge, Vec2::new(0.0, -0.25), Vec2::new(3.0, 0.25), SurfaceKind::OneWay, LayerMask::ALL);
    world.add_box(floor, Vec2::new(0.0, -6.0), Vec2::new(10.0, 1.0), SurfaceKind::Solid, LayerMask::ALL);

    let mut body = body();
    let mut position = Vec2::new(0.0, 0.505);
    let fall = Vec2::new(0.0, -0.2);

    // Down held for one step starts the drop
    body.move_and_collide(&mut position, fall, Vec2::NEG_Y, false, &world);
    assert_eq!(body.collisions.through_platform, Some(ledge));
    assert!(!body.collisions.below);

    for _ in 0..40 {
        body.move_and_collide(&mut position, fall, Vec2::ZERO, false, &world);
    }
    assert!(body.collisions.below);
    assert_eq!(body.collisions.through_platform, None);
    assert!((position.y - 0.5 - (-5.0)).abs() < EPSILON);

    // Jump back up through the ledge from below
    for _ in 0..20 {
        body.move_and_collide(&mut position, Vec2::new(0.0, 0.3), Vec2::ZERO, false, &world);
        assert!(!body.collisions.above);
    }
    assert!(position.y - 0.5 > 0.0);

    // Without down held the ledge is solid again
    for _ in 0..20 {
        body.move_and_collide(&mut position, fall, Vec2::ZERO, false, &world);
    }
    assert!(body.collisions.below);
    assert!((position.y - 0.5).abs() < EPSILON);
}

/// Climbing sweeps upward, past one-way surfaces, so holding down has
/// nothing to drop through
#[test]
fn down_held_while_climbing_one_way_ramp_keeps_climbing() {
    let mut entities = World::new();
    let ramp = entities.spawn_empty().id();
    let mut world = ColliderSet::new();
    world.add_box(
        entities.spawn_empty().id(),
        Vec2::new(0.0, -5.0),
        Vec2::new(50.0, 5.0),
        SurfaceKind::Solid,
        LayerMask::ALL,
    );
    let tan = 30.0_f32.to_radians().tan();
    world.add_polygon(
        ramp,
        &[Vec2::new(0.5, 0.0), Vec2::new(20.5, 20.0 * tan), Vec2::new(20.5, 0.0)],
        SurfaceKind::OneWay,
        LayerMask::ALL,
    );

    let grid = RayGrid::new(Vec2::splat(0.5), SKIN_WIDTH, DISTANCE_BETWEEN_RAYS).unwrap();
    let settings = SweepSettings {
        skin_width: SKIN_WIDTH,
        max_slope_angle: 80.0,
        collision_mask: LayerMask::ALL,
    };
    let mut state = CollisionState {
        slope_angle: 30.0,
        ..default()
    };
    let mut center = Vec2::new(-0.0001, 0.5 + SKIN_WIDTH);
    let run = 0.1;

    for step in 0..10 {
        let velocity = CollisionResolver::new(
            &world,
            settings,
            grid.origins(center),
            grid.spacing(),
            Vec2::new(1.0, -1.0),
        )
        .resolve(&mut state, Vec2::new(run, -0.01));
        center += velocity;

        assert!(state.climbing_slope(), "step {step}");
        assert!(state.below, "step {step}");
        assert_eq!(state.through_platform, None, "step {step}");
        assert!(velocity.y > 0.0, "step {step}");
    }

    // Leading bottom ray origin never sank below the ramp surface
    let origin = grid.origins(center).bottom_right;
    let surface = (origin.x - 0.5) * tan;
    assert!(origin.y > surface - EPSILON, "origin {origin} surface {surface}");
}
