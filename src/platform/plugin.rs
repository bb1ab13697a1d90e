use avian2d::prelude::*;
use bevy::prelude::*;

use super::{CarryStep, MovingPlatform, PlatformPath};
use crate::physics::{
    GameLayer, KinematicBody, KinematicColliders, KinematicSync, OneWayPlatform, OneWayQuery,
    SpatialRayCaster,
};

/// Plugin that drives [`MovingPlatform`]s along their paths
pub struct PlatformPlugin;

impl Plugin for PlatformPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(FixedUpdate, PlatformSystems.after(KinematicSync));
        app.add_systems(FixedUpdate, move_platforms.in_set(PlatformSystems));
    }
}

/// Platform motion; runs after the players have moved, so a carried rider
/// keeps its grounded hint into the next step
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformSystems;

/// Moves every platform one step and carries its passengers.
///
/// Passengers are moved through their own [`KinematicBody`] so they still
/// collide with the rest of the world, the carrying platform included.
/// Every move is written back to [`KinematicColliders`] at once, so the
/// next cast sees it.
pub fn move_platforms(
    spatial_query: SpatialQuery,
    one_way: OneWayQuery,
    mut kinematic: ResMut<KinematicColliders>,
    mut platforms: Query<(Entity, &mut MovingPlatform, &mut Transform)>,
    mut passengers: Query<(&mut KinematicBody, &mut Transform), Without<MovingPlatform>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (platform_entity, mut platform, mut platform_transform) in &mut platforms {
        let position = platform_transform.translation.truncate();
        let step = {
            let caster = SpatialRayCaster::new(
                &spatial_query,
                &one_way,
                &kinematic,
                platform.passenger_mask,
                [platform_entity],
            );
            platform.step(position, dt, now, &caster)
        };

        if !step.passengers.is_empty() {
            trace!(
                "platform {platform_entity:?} moving {} passengers",
                step.passengers.len()
            );
        }

        step.apply(|carry| match carry {
            CarryStep::Passenger(m) => {
                let Ok((mut body, mut transform)) = passengers.get_mut(m.passenger) else {
                    return;
                };
                let mut position = transform.translation.truncate();
                let moved = {
                    let caster = SpatialRayCaster::new(
                        &spatial_query,
                        &one_way,
                        &kinematic,
                        body.config().collision_mask,
                        [m.passenger],
                    );
                    body.carry(&mut position, m.velocity, m.standing_on_platform, &caster)
                };
                transform.translation = position.extend(transform.translation.z);
                kinematic.translate(m.passenger, moved);
            }
            CarryStep::Platform(delta) => {
                platform_transform.translation += delta.extend(0.0);
                kinematic.translate(platform_entity, delta);
            }
        });
    }
}

/// Spawns a moving platform at `center`.
///
/// Logs and returns `None` when the box is too small for its ray layout.
pub fn spawn_moving_platform(
    commands: &mut Commands,
    center: Vec2,
    half_extents: Vec2,
    path: PlatformPath,
    one_way: bool,
) -> Option<Entity> {
    let platform = match MovingPlatform::new(half_extents, path) {
        Ok(platform) => platform,
        Err(err) => {
            error!("not spawning moving platform at {center}: {err}");
            return None;
        }
    };

    let mut entity = commands.spawn((
        platform,
        RigidBody::Kinematic,
        Collider::rectangle(half_extents.x * 2.0, half_extents.y * 2.0),
        CollisionLayers::new(GameLayer::Platform, [GameLayer::Player]),
        Transform::from_translation(center.extend(0.0)),
        Visibility::default(),
    ));
    if one_way {
        entity.insert(OneWayPlatform);
    }

    Some(entity.id())
}
