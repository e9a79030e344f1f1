pub mod physics;
pub mod player;

pub use physics::PhysicsPlugin;
pub use player::PlayerPlugin;

use bevy::prelude::*;

/// Unified plugin that adds physics and the player controller.
///
/// Camera and look control are left to the host, which keeps each player's
/// `Orientation` up to date.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PhysicsPlugin>() {
            app.add_plugins(PhysicsPlugin);
        }
        if !app.is_plugin_added::<PlayerPlugin>() {
            app.add_plugins(PlayerPlugin);
        }
    }
}

pub mod prelude {
    pub use crate::physics::{GameLayer, PhysicsPlugin, SlopeInfo};
    pub use crate::player::{
        spawn_player, AscentGuard, JumpAscent, JumpGate, LocomotionMessage, MovementState,
        Orientation, Player, PlayerConfig, PlayerPlugin, Posture, SlideSession, TargetSpeed,
    };
    pub use crate::LocomotionPlugin;
}
