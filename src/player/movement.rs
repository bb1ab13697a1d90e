use avian2d::prelude::*;
use bevy::prelude::*;

use super::input::{snap_axes, DirectionalInput};
use super::state::*;
use crate::physics::{
    CollisionState, KinematicBody, KinematicColliders, OneWayQuery, SpatialRayCaster,
};

/// Shortest smoothing time accepted, avoids dividing by zero
const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Critically damped approach of `current` toward `target`.
///
/// `rate` carries the rate of change between calls and must be kept by the
/// caller. Never overshoots `target`.
pub fn smooth_damp(current: f32, target: f32, rate: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*rate + omega * change) * dt;
    *rate = (*rate - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot
    if (target - current > 0.0) == (output > target) {
        output = target;
        *rate = 0.0;
    }

    output
}

impl PlayerMotion {
    /// Smooths horizontal speed toward the input and applies gravity.
    pub fn calculate_velocity(
        &mut self,
        config: &PlayerConfig,
        profile: &JumpProfile,
        input_x: f32,
        grounded: bool,
        dt: f32,
    ) {
        let target_velocity_x = input_x * config.move_speed;
        let smooth_time = if grounded {
            config.acceleration_time_grounded
        } else {
            config.acceleration_time_airborne
        };

        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_velocity_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            dt,
        );
        self.velocity.y += profile.gravity * dt;
    }

    /// Updates wall-slide state from the last move's contacts.
    ///
    /// `input_x` is the snapped horizontal input: -1, 0 or 1.
    pub fn handle_wall_sliding(
        &mut self,
        config: &PlayerConfig,
        collisions: &CollisionState,
        input_x: f32,
        dt: f32,
    ) {
        self.wall_dir_x = collisions.wall_direction();
        self.wall_sliding = false;

        if !collisions.touching_wall() || collisions.below || self.velocity.y >= 0.0 {
            return;
        }

        self.wall_sliding = true;
        self.velocity.y = self.velocity.y.max(-config.wall_slide_speed_max);

        if self.time_to_wall_unstick > 0.0 {
            self.velocity_x_smoothing = 0.0;
            self.velocity.x = 0.0;

            // Only pulling away from the wall counts down
            if input_x != self.wall_dir_x && input_x != 0.0 {
                self.time_to_wall_unstick -= dt;
            } else {
                self.time_to_wall_unstick = config.wall_stick_time;
            }
        } else {
            self.time_to_wall_unstick = config.wall_stick_time;
        }
    }

    /// Reacts to floor and ceiling contact after the move.
    pub fn after_move(&mut self, profile: &JumpProfile, collisions: &CollisionState, dt: f32) {
        if !(collisions.above || collisions.below) {
            return;
        }

        if collisions.sliding_down_max_slope() {
            self.velocity.y += collisions.slope_normal.y * -profile.gravity * dt;
        } else {
            self.velocity.y = 0.0;
        }
    }
}

/// Keeps the derived jump profile in step with config edits
pub fn refresh_jump_profile(
    mut query: Query<(&PlayerConfig, &mut JumpProfile), Changed<PlayerConfig>>,
) {
    for (config, mut profile) in &mut query {
        *profile = JumpProfile::from(config);
    }
}

/// Applies horizontal smoothing and gravity
pub fn calculate_velocity(
    mut query: Query<
        (
            &PlayerConfig,
            &JumpProfile,
            &DirectionalInput,
            &KinematicBody,
            &mut PlayerMotion,
        ),
        With<Player>,
    >,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (config, profile, input, body, mut motion) in &mut query {
        motion.calculate_velocity(config, profile, input.x, body.collisions.below, dt);
    }
}

/// Enters, holds, or leaves the wall slide
pub fn handle_wall_sliding(
    mut query: Query<(&PlayerConfig, &DirectionalInput, &KinematicBody, &mut PlayerMotion), With<Player>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (config, input, body, mut motion) in &mut query {
        let input_x = input.snapped(config.input_deadzone).x;
        motion.handle_wall_sliding(config, &body.collisions, input_x, dt);
    }
}

/// Sweeps each player by its velocity for this step
pub fn move_players(
    spatial_query: SpatialQuery,
    one_way: OneWayQuery,
    mut kinematic: ResMut<KinematicColliders>,
    mut query: Query<
        (
            Entity,
            &PlayerConfig,
            &DirectionalInput,
            &PlayerMotion,
            &mut KinematicBody,
            &mut Transform,
        ),
        With<Player>,
    >,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (entity, config, input, motion, mut body, mut transform) in &mut query {
        let input = snap_axes(input.0, config.input_deadzone);

        let mut position = transform.translation.truncate();
        let moved = {
            let caster = SpatialRayCaster::new(
                &spatial_query,
                &one_way,
                &kinematic,
                body.config().collision_mask,
                [entity],
            );
            body.move_and_collide(&mut position, motion.velocity * dt, input, false, &caster)
        };
        transform.translation = position.extend(transform.translation.z);
        kinematic.translate(entity, moved);
    }
}

/// Zeroes vertical speed on floor/ceiling contact, or keeps sliding down a
/// too-steep slope
pub fn resolve_vertical_contact(
    mut query: Query<(&JumpProfile, &KinematicBody, &mut PlayerMotion), With<Player>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (profile, body, mut motion) in &mut query {
        motion.after_move(profile, &body.collisions, dt);
    }
}

/// Mirrors contact state into `Grounded` / `WallSliding` markers
pub fn update_contact_markers(
    mut commands: Commands,
    query: Query<
        (
            Entity,
            &KinematicBody,
            &PlayerMotion,
            Has<Grounded>,
            Has<WallSliding>,
        ),
        With<Player>,
    >,
) {
    for (entity, body, motion, grounded, wall_sliding) in &query {
        match (body.collisions.below, grounded) {
            (true, false) => {
                commands.entity(entity).insert(Grounded);
            }
            (false, true) => {
                commands.entity(entity).remove::<Grounded>();
            }
            _ => {}
        }

        match (motion.wall_sliding, wall_sliding) {
            (true, false) => {
                commands.entity(entity).insert(WallSliding);
            }
            (false, true) => {
                commands.entity(entity).remove::<WallSliding>();
            }
            _ => {}
        }
    }
}
