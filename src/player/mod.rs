pub mod input;
mod jump;
mod messages;
mod movement;
mod plugin;
mod state;

pub use input::{DirectionalInput, JumpPressed, JumpReleased};
pub use jump::apply_jump_input;
pub use messages::{emit_player_messages, MotionTracker, PlayerMotionMessage};
pub use movement::{
    calculate_velocity, handle_wall_sliding, move_players, refresh_jump_profile,
    resolve_vertical_contact, smooth_damp, update_contact_markers,
};
pub use plugin::{spawn_player, PlayerPlugin, PlayerSystems};
pub use state::*;
