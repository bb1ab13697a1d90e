use bevy::prelude::*;

use super::input::{DirectionalInput, JumpPressed, JumpReleased};
use super::messages::MotionTracker;
use super::state::*;
use crate::physics::{sign, CollisionState, KinematicBody};

impl PlayerMotion {
    /// Applies a jump impulse if the player can jump right now.
    ///
    /// `input` is the snapped directional input. Returns what kind of jump
    /// happened, if any.
    pub fn on_jump_pressed(
        &mut self,
        config: &PlayerConfig,
        profile: &JumpProfile,
        collisions: &CollisionState,
        input: Vec2,
    ) -> Option<JumpKind> {
        if self.wall_sliding {
            let (kind, impulse) = if input.x == self.wall_dir_x {
                (WallJumpKind::Climb, config.wall_jump_climb)
            } else if input.x == 0.0 {
                (WallJumpKind::Off, config.wall_jump_off)
            } else {
                (WallJumpKind::Leap, config.wall_leap)
            };
            self.velocity = Vec2::new(-self.wall_dir_x * impulse.x, impulse.y);
            return Some(JumpKind::Wall(kind));
        }

        if !collisions.below {
            return None;
        }

        if collisions.sliding_down_max_slope() {
            // Pushing further into the slope can't launch off it
            if input.x == -sign(collisions.slope_normal.x) {
                return None;
            }
            self.velocity = collisions.slope_normal * profile.max_jump_velocity;
            return Some(JumpKind::Slope);
        }

        self.velocity.y = profile.max_jump_velocity;
        Some(JumpKind::Ground)
    }

    /// Cuts an ascending jump short.
    pub fn on_jump_released(&mut self, profile: &JumpProfile) {
        if self.velocity.y > profile.min_jump_velocity {
            self.velocity.y = profile.min_jump_velocity;
        }
    }
}

/// Consumes jump press/release edges collected since the last step
pub fn apply_jump_input(
    mut query: Query<
        (
            Entity,
            &PlayerConfig,
            &JumpProfile,
            &DirectionalInput,
            &KinematicBody,
            &mut PlayerMotion,
            &mut JumpPressed,
            &mut JumpReleased,
            &mut MotionTracker,
        ),
        With<Player>,
    >,
) {
    for (entity, config, profile, input, body, mut motion, mut pressed, mut released, mut tracker) in
        &mut query
    {
        if pressed.0 {
            pressed.0 = false;
            let input = input.snapped(config.input_deadzone);
            if let Some(kind) = motion.on_jump_pressed(config, profile, &body.collisions, input) {
                debug!("player {entity:?} jumped: {kind:?}");
                tracker.pending_jump = Some(kind);
            }
        }

        if released.0 {
            released.0 = false;
            motion.on_jump_released(profile);
        }
    }
}
