use bevy::ecs::observer::On;
use bevy::prelude::{Component, Deref, DerefMut, EntityEvent, Query, Vec2};
use bevy_enhanced_input::prelude::*;

/// Move / aim direction (WASD, arrows)
#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct MoveAction;

/// Jump action
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct JumpAction;

/// Stores the current directional input, each axis in `[-1, 1]`
#[derive(Component, Default, Deref, DerefMut)]
pub struct DirectionalInput(pub Vec2);

impl DirectionalInput {
    /// Input with each axis snapped to -1, 0 or 1.
    pub fn snapped(&self, deadzone: f32) -> Vec2 {
        snap_axes(self.0, deadzone)
    }
}

/// Snaps each axis to -1, 0 or 1, treating anything within `deadzone` as 0.
pub fn snap_axes(input: Vec2, deadzone: f32) -> Vec2 {
    let snap = |axis: f32| {
        if axis == 0.0 || axis.abs() < deadzone {
            0.0
        } else {
            axis.signum()
        }
    };
    Vec2::new(snap(input.x), snap(input.y))
}

/// Stores whether jump was pressed since the last fixed step
#[derive(Component, Default)]
pub struct JumpPressed(pub bool);

/// Stores whether jump was released since the last fixed step
#[derive(Component, Default)]
pub struct JumpReleased(pub bool);

/// System to handle move input via observer
pub fn handle_move_input(trigger: On<Fire<MoveAction>>, mut query: Query<&mut DirectionalInput>) {
    if let Ok(mut input) = query.get_mut(trigger.event_target()) {
        input.0 = trigger.value.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }
}

/// Clear move input when all movement keys are released
pub fn handle_move_end(trigger: On<Complete<MoveAction>>, mut query: Query<&mut DirectionalInput>) {
    if let Ok(mut input) = query.get_mut(trigger.event_target()) {
        input.0 = Vec2::ZERO;
    }
}

/// Handle jump press
pub fn handle_jump_start(trigger: On<Start<JumpAction>>, mut query: Query<&mut JumpPressed>) {
    if let Ok(mut jump) = query.get_mut(trigger.event_target()) {
        jump.0 = true;
    }
}

/// Handle jump release
pub fn handle_jump_end(trigger: On<Complete<JumpAction>>, mut query: Query<&mut JumpReleased>) {
    if let Ok(mut released) = query.get_mut(trigger.event_target()) {
        released.0 = true;
    }
}
