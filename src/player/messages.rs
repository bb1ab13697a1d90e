use bevy::prelude::*;

use super::state::*;
use crate::physics::KinematicBody;

/// Motion event messages emitted by the player controller.
///
/// Consumers subscribe with `MessageReader<PlayerMotionMessage>` to trigger
/// sound effects, particles, or other feedback.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum PlayerMotionMessage {
    Landed { player: Entity, impact_speed: f32 },
    Jumped { player: Entity },
    WallJumped { player: Entity, kind: WallJumpKind },
    WallSlideStart { player: Entity },
    WallSlideEnd { player: Entity },
    SlopeSlideStart { player: Entity },
    SlopeSlideEnd { player: Entity },
    DroppedThrough { player: Entity, platform: Entity },
}

/// Landings slower than this are not reported
const MIN_LANDING_SPEED: f32 = 1.0;

/// Tracks previous-step state for edge detection in message emission.
#[derive(Component, Default, Debug)]
pub struct MotionTracker {
    pub was_grounded: bool,
    pub was_wall_sliding: bool,
    pub was_slope_sliding: bool,
    pub was_dropping_through: bool,
    pub last_vertical_velocity: f32,
    /// Jump performed this step, set by the jump system
    pub pending_jump: Option<JumpKind>,
}

impl MotionTracker {
    /// Compares this step's state with the last one and collects the
    /// resulting messages.
    pub fn observe(
        &mut self,
        player: Entity,
        body: &KinematicBody,
        motion: &PlayerMotion,
    ) -> Vec<PlayerMotionMessage> {
        let mut messages = Vec::new();
        let collisions = &body.collisions;
        let grounded = collisions.below;
        let slope_sliding = collisions.sliding_down_max_slope();

        // --- Jump ---
        match self.pending_jump.take() {
            Some(JumpKind::Wall(kind)) => {
                messages.push(PlayerMotionMessage::WallJumped { player, kind })
            }
            Some(_) => messages.push(PlayerMotionMessage::Jumped { player }),
            None => {}
        }

        // --- Landing ---
        if !self.was_grounded && grounded {
            let impact_speed = (-self.last_vertical_velocity).max(0.0);
            if impact_speed > MIN_LANDING_SPEED {
                messages.push(PlayerMotionMessage::Landed {
                    player,
                    impact_speed,
                });
            }
        }

        // --- Wall slide ---
        if !self.was_wall_sliding && motion.wall_sliding {
            messages.push(PlayerMotionMessage::WallSlideStart { player });
        }
        if self.was_wall_sliding && !motion.wall_sliding {
            messages.push(PlayerMotionMessage::WallSlideEnd { player });
        }

        // --- Slope slide ---
        if !self.was_slope_sliding && slope_sliding {
            messages.push(PlayerMotionMessage::SlopeSlideStart { player });
        }
        if self.was_slope_sliding && !slope_sliding {
            messages.push(PlayerMotionMessage::SlopeSlideEnd { player });
        }

        // --- Drop through ---
        if let Some(platform) = collisions.through_platform {
            if !self.was_dropping_through {
                messages.push(PlayerMotionMessage::DroppedThrough { player, platform });
            }
        }

        // --- Update tracker ---
        self.was_grounded = grounded;
        self.was_wall_sliding = motion.wall_sliding;
        self.was_slope_sliding = slope_sliding;
        self.was_dropping_through = collisions.through_platform.is_some();
        self.last_vertical_velocity = motion.velocity.y;

        messages
    }
}

/// Emits `PlayerMotionMessage`s for state transitions
pub fn emit_player_messages(
    mut query: Query<(Entity, &KinematicBody, &PlayerMotion, &mut MotionTracker), With<Player>>,
    mut writer: MessageWriter<PlayerMotionMessage>,
) {
    for (entity, body, motion, mut tracker) in &mut query {
        writer.write_batch(tracker.observe(entity, body, motion));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyConfig;

    fn body() -> KinematicBody {
        KinematicBody::new(Vec2::splat(0.5), BodyConfig::default()).unwrap()
    }

    #[test]
    fn landing_reports_impact_speed() {
        let player = World::new().spawn_empty().id();
        let mut tracker = MotionTracker::default();
        let mut body = body();
        let falling = PlayerMotion {
            velocity: Vec2::new(0.0, -12.0),
            ..default()
        };

        assert!(tracker.observe(player, &body, &falling).is_empty());

        body.collisions.below = true;
        let messages = tracker.observe(player, &body, &PlayerMotion::default());

        assert_eq!(
            messages,
            vec![PlayerMotionMessage::Landed {
                player,
                impact_speed: 12.0
            }]
        );
    }

    #[test]
    fn gentle_landing_is_silent() {
        let player = World::new().spawn_empty().id();
        let mut tracker = MotionTracker {
            last_vertical_velocity: -0.5,
            ..default()
        };
        let mut body = body();
        body.collisions.below = true;

        assert!(tracker.observe(player, &body, &PlayerMotion::default()).is_empty());
    }

    #[test]
    fn wall_jump_and_slide_edges() {
        let player = World::new().spawn_empty().id();
        let mut tracker = MotionTracker::default();
        let body = body();
        let sliding = PlayerMotion {
            wall_sliding: true,
            ..default()
        };

        let messages = tracker.observe(player, &body, &sliding);
        assert_eq!(messages, vec![PlayerMotionMessage::WallSlideStart { player }]);
        assert!(tracker.observe(player, &body, &sliding).is_empty());

        tracker.pending_jump = Some(JumpKind::Wall(WallJumpKind::Leap));
        let messages = tracker.observe(player, &body, &PlayerMotion::default());
        assert_eq!(
            messages,
            vec![
                PlayerMotionMessage::WallJumped {
                    player,
                    kind: WallJumpKind::Leap
                },
                PlayerMotionMessage::WallSlideEnd { player },
            ]
        );
        assert_eq!(tracker.pending_jump, None);
    }

    #[test]
    fn drop_through_reported_once() {
        let mut world = World::new();
        let player = world.spawn_empty().id();
        let platform = world.spawn_empty().id();
        let mut tracker = MotionTracker::default();
        let mut body = body();
        body.collisions.through_platform = Some(platform);

        let messages = tracker.observe(player, &body, &PlayerMotion::default());
        assert_eq!(
            messages,
            vec![PlayerMotionMessage::DroppedThrough { player, platform }]
        );
        assert!(tracker.observe(player, &body, &PlayerMotion::default()).is_empty());
    }
}
