use avian3d::prelude::*;
use bevy::prelude::*;

/// Standard gravity, matched to the unit-mass force tuning in `PlayerConfig`
pub const GRAVITY: f32 = 9.81;

/// Plugin that sets up the Avian3D physics engine
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            PhysicsPlugins::default()
                .with_length_unit(1.0), // 1 unit = 1 meter
        );

        app.insert_resource(Gravity(Vec3::NEG_Y * GRAVITY));
    }
}

/// Headless app with the physics engine and a fixed 60 Hz frame clock
#[cfg(test)]
pub(crate) fn headless_physics_app() -> App {
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        bevy::asset::AssetPlugin::default(),
        bevy::scene::ScenePlugin,
        PhysicsPlugin,
    ))
    .init_asset::<Mesh>()
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));
    app.finish();
    app.cleanup();
    app
}

/// Runs enough frames for static colliders to land in the spatial query structures
#[cfg(test)]
pub(crate) fn settle(app: &mut App) {
    for _ in 0..5 {
        app.update();
    }
}
