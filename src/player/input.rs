use avian3d::prelude::Position;
use bevy::ecs::observer::On;
use bevy::prelude::{Component, Deref, DerefMut, EntityEvent, Query, Vec2, With};
use bevy_enhanced_input::prelude::*;

use super::state::{AscentGuard, JumpGate, MovementState, Player, SlideSession};
use crate::physics::SlopeInfo;

/// Move in a direction (x = strafe, y = forward/back)
#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct MoveAction;

/// Jump action (hold to keep jumping each cooldown)
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct JumpAction;

/// Sprint action (hold)
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct SprintAction;

/// Crouch action (hold; the press edge triggers slides)
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct CrouchAction;

/// The forward key on its own, required for sprinting and sliding
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct ForwardAction;

/// Stores the current raw movement axes
#[derive(Component, Default, Deref, DerefMut)]
pub struct MoveInput(pub Vec2);

/// Stores whether jump is held
#[derive(Component, Default, Deref, DerefMut)]
pub struct JumpInput(pub bool);

/// Stores whether sprint is held
#[derive(Component, Default, Deref, DerefMut)]
pub struct SprintInput(pub bool);

/// Stores whether crouch is held
#[derive(Component, Default, Deref, DerefMut)]
pub struct CrouchInput(pub bool);

/// Stores whether crouch was pressed this frame
#[derive(Component, Default)]
pub struct CrouchPressed(pub bool);

/// Stores whether the forward key is held
#[derive(Component, Default, Deref, DerefMut)]
pub struct ForwardInput(pub bool);

/// Raw key and axis state for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub move_axes: Vec2,
    pub jump_held: bool,
    pub sprint_held: bool,
    pub crouch_held: bool,
    pub crouch_pressed: bool,
    pub forward_held: bool,
}

/// What the player is asking for this frame after gating
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputIntent {
    pub move_axes: Vec2,
    pub jump_requested: bool,
    pub slide_requested: bool,
    pub crouch_held: bool,
}

/// Gated intent for the current frame, consumed by the jump, crouch and state systems
#[derive(Component, Default, Deref, DerefMut)]
pub struct PlayerIntent(pub InputIntent);

/// Gates raw input against grounding, the previous state and both cooldown gates.
///
/// `ascending` comes from the slope-ascent guard and vetoes slides uphill.
/// Nothing is requested while airborne.
pub fn sample_intent(
    input: &InputSnapshot,
    state: MovementState,
    grounded: bool,
    ascending: bool,
    slide: &SlideSession,
    jump: &JumpGate,
) -> InputIntent {
    let jump_requested = grounded
        && input.jump_held
        && jump.ready
        && state != MovementState::Crouching
        && state != MovementState::Sliding;

    let slide_requested = grounded
        && !ascending
        && input.sprint_held
        && input.crouch_pressed
        && input.forward_held
        && state != MovementState::Crouching
        && slide.ready_to_restart;

    InputIntent {
        move_axes: input.move_axes,
        jump_requested,
        slide_requested,
        crouch_held: input.crouch_held,
    }
}

/// Samples the stored input once per frame and gates it into `PlayerIntent`.
///
/// While grounded the ascent guard is sampled every frame, whether or not a
/// slide is being attempted.
pub fn sample_player_intent(
    mut query: Query<
        (
            &MoveInput,
            &JumpInput,
            &SprintInput,
            &CrouchInput,
            &CrouchPressed,
            &ForwardInput,
            &MovementState,
            &SlopeInfo,
            &SlideSession,
            &JumpGate,
            &Position,
            &mut AscentGuard,
            &mut PlayerIntent,
        ),
        With<Player>,
    >,
) {
    for (
        move_input,
        jump,
        sprint,
        crouch,
        crouch_pressed,
        forward,
        state,
        slope,
        slide,
        jump_gate,
        position,
        mut guard,
        mut intent,
    ) in &mut query
    {
        let snapshot = InputSnapshot {
            move_axes: move_input.0,
            jump_held: jump.0,
            sprint_held: sprint.0,
            crouch_held: crouch.0,
            crouch_pressed: crouch_pressed.0,
            forward_held: forward.0,
        };

        let ascending = slope.grounded && guard.is_ascending(position.y);

        intent.0 = sample_intent(&snapshot, *state, slope.grounded, ascending, slide, jump_gate);
    }
}

/// System to handle move input via observer
pub fn handle_move_input(trigger: On<Fire<MoveAction>>, mut query: Query<&mut MoveInput>) {
    if let Ok(mut move_input) = query.get_mut(trigger.event_target()) {
        move_input.0 = trigger.value.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }
}

/// Clear move input when all movement keys are released
pub fn handle_move_end(trigger: On<Complete<MoveAction>>, mut query: Query<&mut MoveInput>) {
    if let Ok(mut move_input) = query.get_mut(trigger.event_target()) {
        move_input.0 = Vec2::ZERO;
    }
}

/// Handle jump press
pub fn handle_jump_start(trigger: On<Start<JumpAction>>, mut query: Query<&mut JumpInput>) {
    if let Ok(mut jump) = query.get_mut(trigger.event_target()) {
        jump.0 = true;
    }
}

/// Handle jump release
pub fn handle_jump_end(trigger: On<Complete<JumpAction>>, mut query: Query<&mut JumpInput>) {
    if let Ok(mut jump) = query.get_mut(trigger.event_target()) {
        jump.0 = false;
    }
}

/// Handle sprint start
pub fn handle_sprint_start(trigger: On<Start<SprintAction>>, mut query: Query<&mut SprintInput>) {
    if let Ok(mut sprint) = query.get_mut(trigger.event_target()) {
        sprint.0 = true;
    }
}

/// Handle sprint end
pub fn handle_sprint_end(trigger: On<Complete<SprintAction>>, mut query: Query<&mut SprintInput>) {
    if let Ok(mut sprint) = query.get_mut(trigger.event_target()) {
        sprint.0 = false;
    }
}

/// Handle crouch start, recording the press edge as well
pub fn handle_crouch_start(
    trigger: On<Start<CrouchAction>>,
    mut query: Query<(&mut CrouchInput, &mut CrouchPressed)>,
) {
    if let Ok((mut held, mut pressed)) = query.get_mut(trigger.event_target()) {
        held.0 = true;
        pressed.0 = true;
    }
}

/// Handle crouch end
pub fn handle_crouch_end(trigger: On<Complete<CrouchAction>>, mut query: Query<&mut CrouchInput>) {
    if let Ok(mut crouch) = query.get_mut(trigger.event_target()) {
        crouch.0 = false;
    }
}

/// Handle forward key press
pub fn handle_forward_start(
    trigger: On<Start<ForwardAction>>,
    mut query: Query<&mut ForwardInput>,
) {
    if let Ok(mut forward) = query.get_mut(trigger.event_target()) {
        forward.0 = true;
    }
}

/// Handle forward key release
pub fn handle_forward_end(
    trigger: On<Complete<ForwardAction>>,
    mut query: Query<&mut ForwardInput>,
) {
    if let Ok(mut forward) = query.get_mut(trigger.event_target()) {
        forward.0 = false;
    }
}

/// Clears the crouch press edge (should run at end of frame)
pub fn clear_crouch_pressed(mut query: Query<&mut CrouchPressed>) {
    for mut pressed in &mut query {
        pressed.0 = false;
    }
}
