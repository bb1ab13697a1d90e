use bevy::prelude::*;

/// Marker component for the player entity (also used as input context)
#[derive(Component, Default)]
pub struct Player;

/// Player movement configuration
#[derive(Component, Clone, Copy, Debug)]
pub struct PlayerConfig {
    /// Half width and half height of the player's box
    pub half_extents: Vec2,
    /// Top horizontal speed in units/s
    pub move_speed: f32,
    /// Apex height of a held jump
    pub max_jump_height: f32,
    /// Apex height of a tapped jump
    pub min_jump_height: f32,
    /// Seconds from take-off to the apex of a held jump
    pub time_to_jump_apex: f32,
    /// Horizontal smoothing time while airborne
    pub acceleration_time_airborne: f32,
    /// Horizontal smoothing time while grounded
    pub acceleration_time_grounded: f32,
    /// Fastest fall while sliding down a wall
    pub wall_slide_speed_max: f32,
    /// Seconds input must point away from a wall before letting go
    pub wall_stick_time: f32,
    /// Wall jump toward the wall (climbing it)
    pub wall_jump_climb: Vec2,
    /// Wall jump with no horizontal input
    pub wall_jump_off: Vec2,
    /// Wall jump away from the wall
    pub wall_leap: Vec2,
    /// Axis magnitude below which an input axis reads as neutral
    pub input_deadzone: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec2::splat(0.5),
            move_speed: 6.0,
            max_jump_height: 4.0,
            min_jump_height: 1.0,
            time_to_jump_apex: 0.4,
            acceleration_time_airborne: 0.2,
            acceleration_time_grounded: 0.1,
            wall_slide_speed_max: 3.0,
            wall_stick_time: 0.25,
            wall_jump_climb: Vec2::new(7.5, 16.0),
            wall_jump_off: Vec2::new(8.5, 7.0),
            wall_leap: Vec2::new(18.0, 17.0),
            input_deadzone: 0.5,
        }
    }
}

impl PlayerConfig {
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Sets the held and tapped jump heights and the time to the held apex.
    pub fn with_jump(mut self, max_height: f32, min_height: f32, time_to_apex: f32) -> Self {
        self.max_jump_height = max_height;
        self.min_jump_height = min_height;
        self.time_to_jump_apex = time_to_apex;
        self
    }

    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }
}

/// Gravity and jump speeds derived from the jump heights in [`PlayerConfig`]
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct JumpProfile {
    /// Vertical acceleration, negative
    pub gravity: f32,
    /// Take-off speed of a held jump
    pub max_jump_velocity: f32,
    /// Speed a released jump is cut down to
    pub min_jump_velocity: f32,
}

impl From<&PlayerConfig> for JumpProfile {
    fn from(config: &PlayerConfig) -> Self {
        let gravity = -(2.0 * config.max_jump_height) / config.time_to_jump_apex.powi(2);
        Self {
            gravity,
            max_jump_velocity: gravity.abs() * config.time_to_jump_apex,
            min_jump_velocity: (2.0 * gravity.abs() * config.min_jump_height).sqrt(),
        }
    }
}

/// Velocity and wall-slide bookkeeping carried between steps
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PlayerMotion {
    /// Velocity in units/s
    pub velocity: Vec2,
    pub wall_sliding: bool,
    /// Side of the wall being touched, -1 left, 1 right
    pub wall_dir_x: f32,
    /// Seconds left before the player lets go of the wall
    pub time_to_wall_unstick: f32,
    /// Rate state for horizontal smoothing
    pub velocity_x_smoothing: f32,
}

/// Marker: player is standing on something
#[derive(Component)]
#[component(storage = "SparseSet")]
pub struct Grounded;

/// Marker: player is sliding down a wall
#[derive(Component)]
#[component(storage = "SparseSet")]
pub struct WallSliding;

/// Which wall jump was performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallJumpKind {
    /// Input toward the wall
    Climb,
    /// No horizontal input
    Off,
    /// Input away from the wall
    Leap,
}

/// What a jump press turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    /// Launched along the normal of a too-steep slope
    Slope,
    Wall(WallJumpKind),
}
