use avian3d::prelude::*;
use bevy::prelude::*;

use super::input::PlayerIntent;
use super::state::*;

/// Overwrites vertical velocity with the jump force, keeping horizontal motion
pub fn jump_velocity(velocity: Vec3, jump_force: f32) -> Vec3 {
    Vec3::new(velocity.x, jump_force, velocity.z)
}

/// Advances the jump cooldown
pub fn tick_jump_gate(mut query: Query<&mut JumpGate, With<Player>>, time: Res<Time>) {
    let dt = time.delta_secs();
    for mut gate in &mut query {
        if !gate.ready {
            gate.tick(dt);
        }
    }
}

/// Ends the mid-jump ascent once the player stops rising
pub fn track_jump_ascent(
    mut commands: Commands,
    query: Query<(Entity, &LinearVelocity), (With<Player>, With<JumpAscent>)>,
) {
    for (entity, velocity) in &query {
        if velocity.y <= 0.0 {
            commands.entity(entity).remove::<JumpAscent>();
        }
    }
}

/// Executes a gated jump request
pub fn handle_jump(
    mut commands: Commands,
    mut query: Query<
        (Entity, &PlayerConfig, &PlayerIntent, &mut JumpGate, &mut LinearVelocity),
        With<Player>,
    >,
) {
    for (entity, config, intent, mut gate, mut velocity) in &mut query {
        if !intent.jump_requested {
            continue;
        }

        velocity.0 = jump_velocity(velocity.0, config.jump_force);
        gate.close(config.jump_cooldown);
        commands.entity(entity).insert(JumpAscent);

        debug!("jump, cooldown {:.2}s", config.jump_cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::input::{sample_intent, InputSnapshot};

    #[test]
    fn jump_overwrites_vertical_velocity() {
        let velocity = jump_velocity(Vec3::new(3.0, -12.0, -1.0), 8.0);
        assert_eq!(velocity, Vec3::new(3.0, 8.0, -1.0));
    }

    #[test]
    fn held_jump_fires_once_per_cooldown_window() {
        let config = PlayerConfig::default().with_jump(8.0, 0.25);
        let input = InputSnapshot {
            jump_held: true,
            ..Default::default()
        };
        let slide = SlideSession::default();
        let mut gate = JumpGate::default();
        let dt = 1.0 / 60.0;

        let mut jumps = 0;
        for _ in 0..15 {
            let intent = sample_intent(&input, MovementState::Walking, true, false, &slide, &gate);
            if intent.jump_requested {
                gate.close(config.jump_cooldown);
                jumps += 1;
            }
            gate.tick(dt);
        }
        // 15 frames at 60 Hz = 0.25s, inside a single window
        assert_eq!(jumps, 1);
    }

    #[test]
    fn jump_system_sets_velocity_and_closes_gate() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, (track_jump_ascent, handle_jump).chain());

        let config = PlayerConfig::default();
        let entity = app
            .world_mut()
            .spawn((
                Player,
                config,
                PlayerIntent(crate::player::input::InputIntent {
                    jump_requested: true,
                    ..Default::default()
                }),
                JumpGate::default(),
                LinearVelocity(Vec3::new(2.0, -1.0, 0.0)),
            ))
            .id();

        app.update();

        let world = app.world();
        assert_eq!(
            world.get::<LinearVelocity>(entity).map(|v| v.0),
            Some(Vec3::new(2.0, config.jump_force, 0.0))
        );
        assert_eq!(world.get::<JumpGate>(entity).map(|g| g.ready), Some(false));
        assert!(world.get::<JumpAscent>(entity).is_some());
    }

    #[test]
    fn ascent_flag_clears_at_apex() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, track_jump_ascent);

        let entity = app
            .world_mut()
            .spawn((Player, JumpAscent, LinearVelocity(Vec3::new(0.0, 0.0, 0.0))))
            .id();

        app.update();
        assert!(app.world().get::<JumpAscent>(entity).is_none());
    }
}
