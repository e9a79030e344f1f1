use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::crouch::*;
use super::input::{
    clear_crouch_pressed, handle_crouch_end, handle_crouch_start, handle_forward_end,
    handle_forward_start, handle_jump_end, handle_jump_start, handle_move_end, handle_move_input,
    handle_sprint_end, handle_sprint_start, sample_player_intent, CrouchAction, CrouchInput,
    CrouchPressed, ForwardAction, ForwardInput, JumpAction, JumpInput, MoveAction, MoveInput,
    PlayerIntent, SprintAction, SprintInput,
};
use super::jump::*;
use super::messages::{emit_locomotion_messages, LocomotionMessage, LocomotionTracker};
use super::movement::*;
use super::state::*;
use crate::physics::{GameLayer, SlopeInfo};

/// Plugin for the first-person locomotion controller
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EnhancedInputPlugin>() {
            app.add_plugins(EnhancedInputPlugin);
        }

        // Register input context for player
        app.add_input_context::<Player>();

        app.add_message::<LocomotionMessage>();
        app.init_resource::<LocomotionTracker>();

        app.register_type::<PlayerConfig>()
            .register_type::<MovementState>()
            .register_type::<Posture>()
            .register_type::<TargetSpeed>()
            .register_type::<Orientation>()
            .register_type::<JumpGate>()
            .register_type::<SlideSession>()
            .register_type::<AscentGuard>()
            .register_type::<SlopeInfo>();

        // Input observers
        app.add_observer(handle_move_input);
        app.add_observer(handle_move_end);
        app.add_observer(handle_jump_start);
        app.add_observer(handle_jump_end);
        app.add_observer(handle_sprint_start);
        app.add_observer(handle_sprint_end);
        app.add_observer(handle_crouch_start);
        app.add_observer(handle_crouch_end);
        app.add_observer(handle_forward_start);
        app.add_observer(handle_forward_end);

        // Per-frame: ground, gates, input, posture, speed limit, state
        app.add_systems(
            Update,
            (
                update_slope_info,
                tick_jump_gate,
                tick_slide_gate,
                track_jump_ascent,
                sample_player_intent,
                handle_jump,
                update_posture,
                update_collider_height,
                limit_player_speed,
                update_movement_state,
                emit_locomotion_messages,
            )
                .chain(),
        );

        // Fixed step: forces go in before Avian integrates
        app.add_systems(
            FixedUpdate,
            (apply_movement_forces, flush_movement_force).chain(),
        );

        // The crouch press edge lives for one frame
        app.add_systems(Last, clear_crouch_pressed);
    }
}

/// Spawns the player entity with all required components
pub fn spawn_player(commands: &mut Commands, config: PlayerConfig, position: Vec3) -> Entity {
    let config = config.sanitized();
    let capsule_height = (config.stand_height - config.radius * 2.0).max(0.0);

    info!("spawning player at {position}");

    commands
        .spawn((
            Player,
            config,
            MovementState::default(),
            Posture::Standing,
            TargetSpeed::default(),
            SlopeInfo::default(),
            Orientation::default(),
            JumpGate::default(),
            SlideSession::default(),
            AscentGuard::new(position.y),
            MovementForce::default(),
        ))
        .insert((
            // Input state
            MoveInput::default(),
            JumpInput::default(),
            SprintInput::default(),
            CrouchInput::default(),
            CrouchPressed::default(),
            ForwardInput::default(),
            PlayerIntent::default(),
        ))
        .insert((
            // Physics - dynamic body driven by forces, rotation locked
            RigidBody::Dynamic,
            Collider::capsule(config.radius, capsule_height),
            CollisionLayers::new(GameLayer::Player, [GameLayer::Default, GameLayer::Ground]),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            LinearDamping(0.0),
            GravityScale(1.0),
            Mass(1.0),
            TranslationInterpolation,
            Friction::new(0.0),  // Drag does the braking
            Restitution::new(0.0),  // No bounce
        ))
        .insert((
            Transform::from_translation(position),
            Visibility::default(),
        ))
        .insert(
            // Input bindings
            actions!(Player[
                (
                    Action::<MoveAction>::new(),
                    bindings![
                        (KeyCode::KeyW, SwizzleAxis::YXZ),
                        (KeyCode::KeyS, SwizzleAxis::YXZ, Negate::all()),
                        KeyCode::KeyD,
                        (KeyCode::KeyA, Negate::all()),
                    ],
                ),
                (
                    Action::<JumpAction>::new(),
                    bindings![KeyCode::Space, GamepadButton::South],
                ),
                (
                    Action::<SprintAction>::new(),
                    bindings![KeyCode::ShiftLeft, GamepadButton::LeftTrigger],
                ),
                (
                    Action::<CrouchAction>::new(),
                    bindings![KeyCode::KeyC, GamepadButton::RightThumb],
                ),
                (
                    Action::<ForwardAction>::new(),
                    bindings![KeyCode::KeyW, GamepadButton::DPadUp],
                ),
            ]),
        )
        .id()
}
