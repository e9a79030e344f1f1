mod crouch;
pub mod input;
mod jump;
mod messages;
pub mod movement;
mod plugin;
pub mod slide;
mod state;

pub use input::{InputIntent, InputSnapshot, MoveInput};
pub use messages::{LocomotionMessage, LocomotionTracker};
pub use plugin::{spawn_player, PlayerPlugin};
pub use state::*;
