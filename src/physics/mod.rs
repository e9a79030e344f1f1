pub mod ground;
mod layers;
mod plugin;

pub use ground::{GroundHit, SlopeInfo};
pub use layers::GameLayer;
pub use plugin::{PhysicsPlugin, GRAVITY};

#[cfg(test)]
pub(crate) use plugin::{headless_physics_app, settle};
