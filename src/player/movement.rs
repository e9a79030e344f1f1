use avian3d::prelude::*;
use bevy::prelude::*;

use super::input::{ForwardInput, MoveInput, PlayerIntent, SprintInput};
use super::slide::slide_force;
use super::state::*;
use crate::physics::{ground, SlopeInfo};

/// Force per unit of target speed on flat ground and in the air
pub const GROUND_FORCE_MULTIPLIER: f32 = 10.0;

/// Force per unit of target speed along a walkable slope
pub const SLOPE_FORCE_MULTIPLIER: f32 = 20.0;

/// Downward force that keeps the player on a slope instead of launching off it
pub const SLOPE_ADHESION_FORCE: f32 = 80.0;

/// Combines the view frame with raw axes. Not normalized.
pub fn movement_direction(orientation: &Orientation, axes: Vec2) -> Vec3 {
    orientation.forward * axes.y + orientation.right * axes.x
}

/// Clamps velocity to `max_speed`.
///
/// With `full_vector` the whole 3D magnitude is clamped; otherwise only the
/// horizontal component is, leaving vertical velocity alone so jumps keep
/// their height.
pub fn limit_speed(velocity: Vec3, max_speed: f32, full_vector: bool) -> Vec3 {
    let max_speed = max_speed.max(0.0);

    if full_vector {
        if velocity.length() > max_speed {
            return velocity.normalize_or_zero() * max_speed;
        }
        return velocity;
    }

    let flat = Vec3::new(velocity.x, 0.0, velocity.z);
    if flat.length() > max_speed {
        let limited = flat.normalize_or_zero() * max_speed;
        Vec3::new(limited.x, velocity.y, limited.z)
    } else {
        velocity
    }
}

/// Inputs for one step of normal (non-slide) movement
#[derive(Clone, Copy, Debug)]
pub struct MoveContext {
    pub direction: Vec3,
    pub slope: SlopeInfo,
    pub target_speed: f32,
    pub vertical_velocity: f32,
    pub jump_ascent: bool,
}

/// Force to add this step for normal movement
pub fn movement_force(ctx: &MoveContext, config: &PlayerConfig) -> Vec3 {
    let speed = ctx.target_speed.max(0.0);

    if ctx.slope.on_walkable_slope(config.max_slope_angle) && !ctx.jump_ascent {
        let mut force = ctx.slope.project(ctx.direction) * speed * SLOPE_FORCE_MULTIPLIER;
        if ctx.vertical_velocity > 0.0 {
            force += Vec3::NEG_Y * SLOPE_ADHESION_FORCE;
        }
        force
    } else if ctx.slope.grounded {
        ctx.direction.normalize_or_zero() * speed * GROUND_FORCE_MULTIPLIER
    } else {
        ctx.direction.normalize_or_zero()
            * speed
            * GROUND_FORCE_MULTIPLIER
            * config.air_multiplier
    }
}

/// Drag for the current grounding
pub fn drag_for(slope: &SlopeInfo, config: &PlayerConfig) -> f32 {
    if slope.grounded {
        config.ground_drag
    } else {
        0.0
    }
}

/// Updates ground classification via a downward sphere cast
pub fn update_slope_info(
    spatial_query: SpatialQuery,
    mut query: Query<(&Position, &PlayerConfig, &Posture, &mut SlopeInfo), With<Player>>,
) {
    for (position, config, posture, mut slope) in &mut query {
        let half_height = config.height_for(*posture) / 2.0;
        *slope = ground::classify(&spatial_query, position.0, config.radius, half_height);
    }
}

/// Clamps player speed to the active target speed
pub fn limit_player_speed(
    mut query: Query<
        (&PlayerConfig, &SlopeInfo, &TargetSpeed, &mut LinearVelocity, Has<JumpAscent>),
        With<Player>,
    >,
) {
    for (config, slope, target, mut velocity, jump_ascent) in &mut query {
        let full_vector = slope.on_walkable_slope(config.max_slope_angle) && !jump_ascent;
        let limited = limit_speed(velocity.0, target.0, full_vector);
        if limited != velocity.0 {
            velocity.0 = limited;
        }
    }
}

/// Computes this step's force, drag and gravity from state and slope data
pub fn apply_movement_forces(
    mut query: Query<
        (
            &PlayerConfig,
            &Position,
            &Orientation,
            &MoveInput,
            &SlopeInfo,
            &TargetSpeed,
            &LinearVelocity,
            &mut SlideSession,
            &mut AscentGuard,
            &mut MovementForce,
            &mut LinearDamping,
            &mut GravityScale,
            Has<JumpAscent>,
        ),
        With<Player>,
    >,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (
        config,
        position,
        orientation,
        input,
        slope,
        target,
        velocity,
        mut slide,
        mut guard,
        mut force,
        mut damping,
        mut gravity,
        jump_ascent,
    ) in &mut query
    {
        let direction = movement_direction(orientation, input.0);
        let on_slope = slope.on_walkable_slope(config.max_slope_angle);

        force.0 += if slide.active {
            slide_force(
                &mut slide,
                &mut guard,
                direction,
                slope,
                config,
                velocity.y,
                position.y,
                dt,
            )
        } else {
            let ctx = MoveContext {
                direction,
                slope: *slope,
                target_speed: target.0,
                vertical_velocity: velocity.y,
                jump_ascent,
            };
            movement_force(&ctx, config)
        };

        // The adhesion force stands in for gravity on walkable slopes
        gravity.0 = if on_slope { 0.0 } else { 1.0 };
        damping.0 = drag_for(slope, config);
    }
}

/// Derives the movement state and target speed for this frame
pub fn update_movement_state(
    mut query: Query<
        (
            &PlayerConfig,
            &SlopeInfo,
            &SlideSession,
            &PlayerIntent,
            &SprintInput,
            &ForwardInput,
            &Posture,
            &mut MovementState,
            &mut TargetSpeed,
        ),
        With<Player>,
    >,
) {
    for (config, slope, slide, intent, sprint, forward, posture, mut state, mut target) in
        &mut query
    {
        let inputs = StateInputs {
            grounded: slope.grounded,
            sliding: slide.active,
            crouch_held: intent.crouch_held,
            posture: *posture,
            sprint_held: sprint.0,
            forward_held: forward.0,
            move_axes: intent.move_axes,
            previous: *state,
        };

        let (next, speed) = derive_state(&inputs, config);
        if let Some(speed) = speed {
            target.set_if_neq(TargetSpeed(speed));
        }
        if *state != next {
            debug!("movement state {:?} -> {:?}", *state, next);
            *state = next;
        }
    }
}

/// Hands the accumulated movement force to the physics step
pub fn flush_movement_force(mut query: Query<(&mut MovementForce, Forces), With<Player>>) {
    for (mut force, mut forces) in &mut query {
        if force.0 != Vec3::ZERO {
            forces.apply_force(force.0);
        }
        force.0 = Vec3::ZERO;
    }
}
