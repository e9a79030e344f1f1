use avian3d::prelude::LinearVelocity;
use bevy::prelude::*;

use super::state::*;
use crate::physics::SlopeInfo;

/// Locomotion event messages emitted by the player controller.
///
/// Consumers subscribe with `MessageReader<LocomotionMessage>` to trigger
/// sound effects, particles, or other feedback.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum LocomotionMessage {
    StateChanged {
        from: MovementState,
        to: MovementState,
    },
    Jumped,
    Landed { impact_speed: f32 },
    SlideStarted,
    SlideEnded,
}

/// Tracks previous-frame state for edge detection in message emission.
#[derive(Resource)]
pub struct LocomotionTracker {
    pub state: MovementState,
    pub was_grounded: bool,
    pub was_sliding: bool,
    pub was_jump_ready: bool,
    pub last_vertical_velocity: f32,
}

impl Default for LocomotionTracker {
    fn default() -> Self {
        Self {
            state: MovementState::default(),
            was_grounded: false,
            was_sliding: false,
            was_jump_ready: true,
            last_vertical_velocity: 0.0,
        }
    }
}

/// Compares current player state against `LocomotionTracker` and emits
/// `LocomotionMessage` events for transitions.
pub fn emit_locomotion_messages(
    query: Query<
        (&MovementState, &SlopeInfo, &SlideSession, &JumpGate, &LinearVelocity),
        With<Player>,
    >,
    mut tracker: ResMut<LocomotionTracker>,
    mut writer: MessageWriter<LocomotionMessage>,
) {
    let Ok((state, slope, slide, jump_gate, velocity)) = query.single() else {
        return;
    };

    if tracker.state != *state {
        writer.write(LocomotionMessage::StateChanged {
            from: tracker.state,
            to: *state,
        });
    }

    // --- Landing ---
    if !tracker.was_grounded && slope.grounded {
        let impact_speed = (-tracker.last_vertical_velocity).max(0.0);
        if impact_speed > 1.0 {
            writer.write(LocomotionMessage::Landed { impact_speed });
        }
    }

    // --- Jumped ---
    if tracker.was_jump_ready && !jump_gate.ready {
        writer.write(LocomotionMessage::Jumped);
    }

    // --- Slide ---
    if !tracker.was_sliding && slide.active {
        writer.write(LocomotionMessage::SlideStarted);
    }
    if tracker.was_sliding && !slide.active {
        writer.write(LocomotionMessage::SlideEnded);
    }

    // --- Update tracker ---
    tracker.state = *state;
    tracker.was_grounded = slope.grounded;
    tracker.was_sliding = slide.active;
    tracker.was_jump_ready = jump_gate.ready;
    tracker.last_vertical_velocity = velocity.y;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Received(Vec<LocomotionMessage>);

    fn collect(mut reader: MessageReader<LocomotionMessage>, mut received: ResMut<Received>) {
        received.0.extend(reader.read().cloned());
    }

    #[test]
    fn emits_transitions_once() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<LocomotionMessage>();
        app.init_resource::<LocomotionTracker>();
        app.init_resource::<Received>();
        app.add_systems(Update, (emit_locomotion_messages, collect).chain());

        let mut gate = JumpGate::default();
        gate.close(0.25);
        let mut slide = SlideSession::default();
        slide.try_start(0.75, 1.0);

        let entity = app
            .world_mut()
            .spawn((
                Player,
                MovementState::Sliding,
                SlopeInfo {
                    grounded: true,
                    normal: Vec3::Y,
                    angle: 0.0,
                },
                slide,
                gate,
                LinearVelocity::default(),
            ))
            .id();

        app.update();
        let received = &app.world().resource::<Received>().0;
        assert!(received.contains(&LocomotionMessage::StateChanged {
            from: MovementState::Idle,
            to: MovementState::Sliding,
        }));
        assert!(received.contains(&LocomotionMessage::Jumped));
        assert!(received.contains(&LocomotionMessage::SlideStarted));

        if let Some(mut slide) = app.world_mut().get_mut::<SlideSession>(entity) {
            slide.active = false;
        }
        app.world_mut().resource_mut::<Received>().0.clear();
        app.update();

        let received = &app.world().resource::<Received>().0;
        assert_eq!(received, &vec![LocomotionMessage::SlideEnded]);
    }
}
