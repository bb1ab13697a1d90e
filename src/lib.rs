pub mod error;
pub mod physics;
pub mod platform;
pub mod player;

#[cfg(feature = "debug-draw")]
pub mod debug;

pub use error::ShapeError;
pub use physics::PhysicsPlugin;
pub use platform::PlatformPlugin;
pub use player::PlayerPlugin;

use bevy::prelude::*;

/// Unified plugin that adds physics, moving platform, and player systems.
pub struct BevyRayPlatformerPlugin;

impl Plugin for BevyRayPlatformerPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PhysicsPlugin>() {
            app.add_plugins(PhysicsPlugin);
        }
        if !app.is_plugin_added::<PlatformPlugin>() {
            app.add_plugins(PlatformPlugin);
        }
        if !app.is_plugin_added::<PlayerPlugin>() {
            app.add_plugins(PlayerPlugin);
        }
        #[cfg(feature = "debug-draw")]
        if !app.is_plugin_added::<debug::DebugDrawPlugin>() {
            app.add_plugins(debug::DebugDrawPlugin);
        }
    }
}

pub mod prelude {
    pub use crate::error::ShapeError;
    pub use crate::physics::{
        BodyConfig, CollisionState, GameLayer, KinematicBody, OneWayPlatform, PhysicsPlugin,
        ColliderSet, KinematicColliders, RayCaster, RayHit, SlopeState, SpatialRayCaster,
        SurfaceKind,
    };
    pub use crate::platform::{
        spawn_moving_platform, MovingPlatform, PathMode, PlatformPath, PlatformPlugin,
    };
    pub use crate::player::{
        spawn_player, DirectionalInput, Grounded, JumpKind, JumpProfile, Player, PlayerConfig,
        PlayerMotion, PlayerMotionMessage, PlayerPlugin, WallJumpKind, WallSliding,
    };
    pub use crate::BevyRayPlatformerPlugin;
}
