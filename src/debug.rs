//! Gizmo overlay for body bounds and the rays cast during the last step.
//!
//! Read-only: nothing drawn here feeds back into the simulation.

use bevy::color::palettes::css::{LIME, ORANGE, RED, SKY_BLUE};
use bevy::prelude::*;

use crate::physics::KinematicBody;
use crate::platform::MovingPlatform;

/// Draws collision debug gizmos
pub struct DebugDrawPlugin;

impl Plugin for DebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (enable_ray_recording, draw_bodies, draw_platforms));
    }
}

fn enable_ray_recording(mut query: Query<&mut KinematicBody, Added<KinematicBody>>) {
    for mut body in &mut query {
        body.record_rays = true;
    }
}

fn draw_bodies(query: Query<(&KinematicBody, &Transform)>, mut gizmos: Gizmos) {
    for (body, transform) in &query {
        let center = transform.translation.truncate();
        gizmos.rect_2d(
            Isometry2d::from_translation(center),
            body.half_extents() * 2.0,
            LIME,
        );

        for ray in body.rays() {
            gizmos.line_2d(ray.origin, ray.end, if ray.hit { RED } else { SKY_BLUE });
        }
    }
}

fn draw_platforms(query: Query<(&MovingPlatform, &Transform)>, mut gizmos: Gizmos) {
    for (platform, transform) in &query {
        gizmos.rect_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            platform.half_extents() * 2.0,
            ORANGE,
        );

        for pair in platform.path.waypoints().windows(2) {
            gizmos.line_2d(pair[0], pair[1], ORANGE.with_alpha(0.4));
        }
    }
}
