use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_ray_platformer::prelude::*;

/// World units per screen pixel at the default zoom
const PIXELS_PER_UNIT: f32 = 32.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ray Platformer Playground".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(BevyRayPlatformerPlugin)
        .init_resource::<JumpTracker>()
        .add_systems(Startup, (setup, spawn_hud))
        .add_systems(Update, (update_hud, log_motion_messages, sync_player_sprite))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 4.0, 0.0),
    ));

    if let Some(player) = spawn_player(&mut commands, Vec2::new(-8.0, 2.0), PlayerConfig::default()) {
        commands.entity(player).insert(Sprite::from_color(
            Color::srgb(0.9, 0.85, 0.3),
            Vec2::ONE,
        ));
    }

    spawn_playground(&mut commands, &mut meshes, &mut materials);
}

// ── HUD ─────────────────────────────────────────────────────────────

#[derive(Component)]
struct HudText;

/// Tracks jump height: records Y when leaving ground, tracks peak
#[derive(Resource, Default)]
struct JumpTracker {
    start_y: f32,
    peak_y: f32,
    last_jump_height: f32,
    was_grounded: bool,
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
    ));
}

fn update_hud(
    player_query: Query<(&PlayerMotion, &KinematicBody, &Transform, Has<Grounded>), With<Player>>,
    mut hud_query: Query<&mut Text, With<HudText>>,
    mut tracker: ResMut<JumpTracker>,
) {
    let Ok((motion, body, transform, grounded)) = player_query.single() else {
        return;
    };

    let y = transform.translation.y;

    if grounded && !tracker.was_grounded {
        tracker.last_jump_height = tracker.peak_y - tracker.start_y;
    }
    if !grounded && tracker.was_grounded {
        tracker.start_y = y;
        tracker.peak_y = y;
    }
    if !grounded {
        tracker.peak_y = tracker.peak_y.max(y);
    }
    tracker.was_grounded = grounded;

    let slope = match body.collisions.slope {
        SlopeState::None => "-".to_string(),
        state => format!("{state:?} {:.0}°", body.collisions.slope_angle),
    };

    for mut text in &mut hud_query {
        **text = format!(
            "Velocity: ({:.1}, {:.1})\nJump:  {:.2}\nSlope: {}\nWall slide: {}",
            motion.velocity.x, motion.velocity.y, tracker.last_jump_height, slope, motion.wall_sliding,
        );
    }
}

fn log_motion_messages(mut reader: MessageReader<PlayerMotionMessage>) {
    for message in reader.read() {
        info!("{message:?}");
    }
}

/// Tints the player while it clings to a wall
fn sync_player_sprite(mut query: Query<(&mut Sprite, Has<WallSliding>), With<Player>>) {
    for (mut sprite, wall_sliding) in &mut query {
        sprite.color = if wall_sliding {
            Color::srgb(0.4, 0.8, 0.9)
        } else {
            Color::srgb(0.9, 0.85, 0.3)
        };
    }
}

// ── Playground ──────────────────────────────────────────────────────

fn spawn_block(commands: &mut Commands, center: Vec2, size: Vec2, color: Color) {
    commands.spawn((
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::World, [GameLayer::Player]),
        Sprite::from_color(color, size),
        Transform::from_translation(center.extend(0.0)),
    ));
}

fn spawn_ramp(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    foot: Vec2,
    run: f32,
    degrees: f32,
) {
    let rise = run.abs() * degrees.to_radians().tan();
    let a = foot;
    let b = foot + Vec2::new(run, 0.0);
    let c = foot + Vec2::new(run, rise);

    commands.spawn((
        RigidBody::Static,
        Collider::triangle(a, b, c),
        CollisionLayers::new(GameLayer::World, [GameLayer::Player]),
        Mesh2d(meshes.add(Triangle2d::new(a, b, c))),
        MeshMaterial2d(materials.add(ramp_color(degrees))),
        Transform::default(),
    ));
}

fn spawn_one_way(commands: &mut Commands, center: Vec2, width: f32) {
    let size = Vec2::new(width, 0.3);
    commands.spawn((
        OneWayPlatform,
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::World, [GameLayer::Player]),
        Sprite::from_color(Color::srgb(0.6, 0.45, 0.3), size),
        Transform::from_translation(center.extend(0.0)),
    ));
}

fn ramp_color(degrees: f32) -> Color {
    // Green for walkable, red past the default max slope
    if degrees > BodyConfig::default().max_slope_angle {
        Color::srgb(0.8, 0.25, 0.2)
    } else {
        let t = (degrees / 80.0).clamp(0.0, 1.0);
        Color::srgb(0.4 + t * 0.4, 0.7 - t * 0.2, 0.4 - t * 0.2)
    }
}

fn spawn_playground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let ground = Color::srgb(0.35, 0.55, 0.35);
    let stone = Color::srgb(0.45, 0.43, 0.47);

    // Floor and outer walls
    spawn_block(commands, Vec2::new(0.0, -0.5), Vec2::new(60.0, 1.0), ground);
    spawn_block(commands, Vec2::new(-30.5, 10.0), Vec2::new(1.0, 22.0), stone);
    spawn_block(commands, Vec2::new(30.5, 10.0), Vec2::new(1.0, 22.0), stone);

    // Wall-jump shaft
    spawn_block(commands, Vec2::new(-24.0, 7.0), Vec2::new(1.0, 12.0), stone);
    spawn_block(commands, Vec2::new(-19.0, 9.0), Vec2::new(1.0, 14.0), stone);

    // Slopes: walkable, walkable, too steep
    spawn_ramp(commands, meshes, materials, Vec2::new(-4.0, 0.0), 4.0, 30.0);
    spawn_ramp(commands, meshes, materials, Vec2::new(4.0, 0.0), 3.0, 55.0);
    spawn_ramp(commands, meshes, materials, Vec2::new(12.0, 0.0), 1.5, 82.0);

    // One-way ledges stacked above the start
    spawn_one_way(commands, Vec2::new(-12.0, 3.0), 4.0);
    spawn_one_way(commands, Vec2::new(-12.0, 6.0), 4.0);

    // Moving platforms: a ping-pong lift and a cyclic loop
    let lift_origin = Vec2::new(18.0, 1.5);
    if let Some(lift) = spawn_moving_platform(
        commands,
        lift_origin,
        Vec2::new(1.5, 0.25),
        PlatformPath::from_local(lift_origin, [Vec2::ZERO, Vec2::new(0.0, 8.0)])
            .with_speed(3.0)
            .with_wait_time(0.5)
            .with_ease_amount(1.5),
        false,
    ) {
        commands.entity(lift).insert(Sprite::from_color(stone, Vec2::new(3.0, 0.5)));
    }

    let loop_origin = Vec2::new(22.0, 10.0);
    if let Some(platform) = spawn_moving_platform(
        commands,
        loop_origin,
        Vec2::new(1.5, 0.25),
        PlatformPath::from_local(
            loop_origin,
            [Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(5.0, 4.0), Vec2::new(0.0, 4.0)],
        )
        .with_speed(2.5)
        .cyclic(),
        true,
    ) {
        commands
            .entity(platform)
            .insert(Sprite::from_color(Color::srgb(0.6, 0.45, 0.3), Vec2::new(3.0, 0.5)));
    }
}
