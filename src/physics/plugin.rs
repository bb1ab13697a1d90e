use avian2d::prelude::*;
use bevy::prelude::*;

use super::colliders::{refresh_kinematic_colliders, KinematicColliders, KinematicSync};

/// Plugin that sets up the Avian2D physics engine
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            PhysicsPlugins::default()
                .with_length_unit(1.0), // 1 unit = 1 tile
        );

        // Bodies integrate their own gravity; Avian only serves ray casts
        // and keeps colliders in sync with transforms
        app.insert_resource(Gravity(Vec2::ZERO));

        app.init_resource::<KinematicColliders>();
        app.add_systems(
            FixedUpdate,
            refresh_kinematic_colliders.in_set(KinematicSync),
        );
    }
}
