use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::input::{
    handle_jump_end, handle_jump_start, handle_move_end, handle_move_input, DirectionalInput,
    JumpAction, JumpPressed, JumpReleased, MoveAction,
};
use super::jump::*;
use super::messages::*;
use super::movement::*;
use super::state::*;
use crate::physics::{BodyConfig, GameLayer, KinematicBody, KinematicSync};
use crate::platform::PlatformSystems;

/// Plugin for the 2D platformer player controller
pub struct PlayerPlugin;

/// Player motion; runs before platforms so a carried rider keeps the
/// platform's grounded hint into the next step
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerSystems;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EnhancedInputPlugin>() {
            app.add_plugins(EnhancedInputPlugin);
        }

        // Register input context for player
        app.add_input_context::<Player>();

        // Input observers
        app.add_observer(handle_move_input);
        app.add_observer(handle_move_end);
        app.add_observer(handle_jump_start);
        app.add_observer(handle_jump_end);

        app.add_message::<PlayerMotionMessage>();

        app.configure_sets(
            FixedUpdate,
            PlayerSystems.after(KinematicSync).before(PlatformSystems),
        );

        // Fixed update systems, one simulation step each
        app.add_systems(
            FixedUpdate,
            (
                refresh_jump_profile,
                apply_jump_input,
                calculate_velocity,
                handle_wall_sliding,
                move_players,
                resolve_vertical_contact,
                update_contact_markers,
                emit_player_messages,
            )
                .chain()
                .in_set(PlayerSystems),
        );
    }
}

/// Spawns a player at `position` with all required components.
///
/// Logs and returns `None` when the configured box is too small for its ray
/// layout.
pub fn spawn_player(
    commands: &mut Commands,
    position: Vec2,
    config: PlayerConfig,
) -> Option<Entity> {
    let body = match KinematicBody::new(config.half_extents, BodyConfig::default()) {
        Ok(body) => body,
        Err(err) => {
            error!("not spawning player at {position}: {err}");
            return None;
        }
    };
    let size = config.half_extents * 2.0;

    let entity = commands
        .spawn((
            Player,
            config,
            JumpProfile::from(&config),
            PlayerMotion::default(),
            MotionTracker::default(),
            body,
        ))
        .insert((
            // Input state
            DirectionalInput::default(),
            JumpPressed::default(),
            JumpReleased::default(),
        ))
        .insert((
            // Physics - kinematic; the body sweeps itself, Avian only hosts
            // the collider for ray casts
            RigidBody::Kinematic,
            Collider::rectangle(size.x, size.y),
            CollisionLayers::new(
                GameLayer::Player,
                [GameLayer::World, GameLayer::Platform, GameLayer::Trigger],
            ),
        ))
        .insert((
            // Transform
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
        ))
        .insert(
            // Input bindings
            actions!(Player[
                (
                    Action::<MoveAction>::new(),
                    bindings![
                        (KeyCode::KeyW, SwizzleAxis::YXZ),
                        (KeyCode::KeyS, SwizzleAxis::YXZ, Negate::all()),
                        KeyCode::KeyD,
                        (KeyCode::KeyA, Negate::all()),
                        (KeyCode::ArrowUp, SwizzleAxis::YXZ),
                        (KeyCode::ArrowDown, SwizzleAxis::YXZ, Negate::all()),
                        KeyCode::ArrowRight,
                        (KeyCode::ArrowLeft, Negate::all()),
                    ],
                ),
                (
                    Action::<JumpAction>::new(),
                    bindings![KeyCode::Space, GamepadButton::South],
                ),
            ]),
        )
        .id();

    debug!("spawned player {entity:?} at {position}");
    Some(entity)
}
