use bevy::prelude::*;

/// Marker component for the player entity (also used as input context)
#[derive(Component, Default)]
pub struct Player;

/// Player movement configuration
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct PlayerConfig {
    /// Linear drag applied while grounded
    pub ground_drag: f32,
    /// Walking speed in m/s
    pub walk_speed: f32,
    /// Sprinting speed in m/s
    pub sprint_speed: f32,
    /// Crouching speed in m/s
    pub crouch_speed: f32,
    /// Vertical velocity set on jump
    pub jump_force: f32,
    /// Seconds before another jump is allowed
    pub jump_cooldown: f32,
    /// Scales movement force while airborne (0.0-1.0)
    pub air_multiplier: f32,
    /// Steepest walkable slope in degrees
    pub max_slope_angle: f32,
    /// Slide duration in seconds
    pub max_slide_time: f32,
    /// Force pushing the player along a slide
    pub slide_force: f32,
    /// Seconds after a slide ends before another may start
    pub slide_cooldown: f32,
    /// Standing collider height
    pub stand_height: f32,
    /// Crouching collider height
    pub crouch_height: f32,
    /// Collider radius
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ground_drag: 5.0,
            walk_speed: 7.0,
            sprint_speed: 10.0,
            crouch_speed: 3.5,
            jump_force: 8.0,
            jump_cooldown: 0.25,
            air_multiplier: 0.4,
            max_slope_angle: 45.0,
            max_slide_time: 0.75,
            slide_force: 200.0,
            slide_cooldown: 1.0,
            stand_height: 2.0,
            crouch_height: 1.0,
            radius: 0.5,
        }
    }
}

impl PlayerConfig {
    pub fn with_speeds(mut self, walk: f32, sprint: f32, crouch: f32) -> Self {
        self.walk_speed = walk;
        self.sprint_speed = sprint;
        self.crouch_speed = crouch;
        self
    }

    pub fn with_jump(mut self, force: f32, cooldown: f32) -> Self {
        self.jump_force = force;
        self.jump_cooldown = cooldown;
        self
    }

    pub fn with_slide(mut self, force: f32, duration: f32, cooldown: f32) -> Self {
        self.slide_force = force;
        self.max_slide_time = duration;
        self.slide_cooldown = cooldown;
        self
    }

    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    pub fn with_heights(mut self, stand: f32, crouch: f32) -> Self {
        self.stand_height = stand;
        self.crouch_height = crouch;
        self
    }

    /// Collider height for a posture
    pub fn height_for(&self, posture: Posture) -> f32 {
        match posture {
            Posture::Standing => self.stand_height,
            Posture::Crouched => self.crouch_height,
        }
    }

    /// Returns a copy with out-of-range knobs clamped, logging each correction.
    ///
    /// Negative speeds, forces and durations become zero and the slope angle
    /// is clamped into [0, 180).
    pub fn sanitized(self) -> Self {
        fn non_negative(name: &str, value: f32) -> f32 {
            if value < 0.0 || value.is_nan() {
                warn!("PlayerConfig::{name} is {value}, clamping to 0");
                0.0
            } else {
                value
            }
        }

        let mut config = self;
        config.ground_drag = non_negative("ground_drag", config.ground_drag);
        config.walk_speed = non_negative("walk_speed", config.walk_speed);
        config.sprint_speed = non_negative("sprint_speed", config.sprint_speed);
        config.crouch_speed = non_negative("crouch_speed", config.crouch_speed);
        config.jump_force = non_negative("jump_force", config.jump_force);
        config.jump_cooldown = non_negative("jump_cooldown", config.jump_cooldown);
        config.air_multiplier = non_negative("air_multiplier", config.air_multiplier);
        config.max_slide_time = non_negative("max_slide_time", config.max_slide_time);
        config.slide_force = non_negative("slide_force", config.slide_force);
        config.slide_cooldown = non_negative("slide_cooldown", config.slide_cooldown);
        config.stand_height = non_negative("stand_height", config.stand_height);
        config.crouch_height = non_negative("crouch_height", config.crouch_height);
        config.radius = non_negative("radius", config.radius);

        let angle = non_negative("max_slope_angle", config.max_slope_angle);
        if angle >= 180.0 {
            warn!("PlayerConfig::max_slope_angle is {angle}, clamping below 180");
            config.max_slope_angle = 179.9;
        } else {
            config.max_slope_angle = angle;
        }

        config
    }
}

/// Discrete locomotion state, exactly one per frame
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[reflect(Component)]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Sprinting,
    Crouching,
    Sliding,
    Airborne,
}

/// Body posture; the collider height is derived from this
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[reflect(Component)]
pub enum Posture {
    #[default]
    Standing,
    Crouched,
}

/// Speed assigned by the most recent state that sets one
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq, Deref, DerefMut)]
#[reflect(Component)]
pub struct TargetSpeed(pub f32);

/// Horizontal view frame written by the camera; the controller only reads it
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct Orientation {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::from_yaw(0.0)
    }
}

impl Orientation {
    /// Frame for a yaw angle in radians around +Y (0 faces -Z)
    pub fn from_yaw(yaw: f32) -> Self {
        let rotation = Quat::from_rotation_y(yaw);
        Self {
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
        }
    }
}

/// Jump permission with an explicit cooldown timer
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct JumpGate {
    pub ready: bool,
    pub cooldown_remaining: f32,
}

impl Default for JumpGate {
    fn default() -> Self {
        Self {
            ready: true,
            cooldown_remaining: 0.0,
        }
    }
}

impl JumpGate {
    /// Closes the gate for `cooldown` seconds
    pub fn close(&mut self, cooldown: f32) {
        self.ready = false;
        self.cooldown_remaining = cooldown.max(0.0);
    }

    /// Advances the cooldown; reopens once it runs out
    pub fn tick(&mut self, dt: f32) {
        if self.ready {
            return;
        }
        self.cooldown_remaining -= dt;
        if self.cooldown_remaining <= 0.0 {
            self.cooldown_remaining = 0.0;
            self.ready = true;
        }
    }
}

/// Marker: the player jumped and is still rising.
///
/// Suppresses slope adhesion and the full-vector speed clamp so a jump
/// started on a slope is not cancelled by them.
#[derive(Component)]
#[component(storage = "SparseSet")]
pub struct JumpAscent;

/// Timed slide with its own restart gate
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct SlideSession {
    pub active: bool,
    pub time_remaining: f32,
    pub ready_to_restart: bool,
    /// Time until `ready_to_restart` flips back on
    pub restart_remaining: f32,
}

impl Default for SlideSession {
    fn default() -> Self {
        Self {
            active: false,
            time_remaining: 0.0,
            ready_to_restart: true,
            restart_remaining: 0.0,
        }
    }
}

impl SlideSession {
    /// Starts a slide if the restart gate is open. Returns whether it started.
    pub fn try_start(&mut self, duration: f32, cooldown: f32) -> bool {
        if !self.ready_to_restart {
            return false;
        }
        self.active = true;
        self.time_remaining = duration;
        self.ready_to_restart = false;
        self.restart_remaining = duration + cooldown;
        true
    }

    /// Spends slide time, ending the session when it runs out
    pub fn consume(&mut self, dt: f32) {
        self.time_remaining -= dt;
        self.end_if_expired();
    }

    pub fn end_if_expired(&mut self) {
        if self.time_remaining <= 0.0 {
            self.active = false;
        }
    }

    /// Advances the restart gate timer
    pub fn tick_restart(&mut self, dt: f32) {
        if self.ready_to_restart {
            return;
        }
        self.restart_remaining -= dt;
        if self.restart_remaining <= 0.0 {
            self.restart_remaining = 0.0;
            self.ready_to_restart = true;
        }
    }
}

/// Tracks altitude between calls to tell whether the player is moving uphill
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq)]
#[reflect(Component)]
pub struct AscentGuard {
    pub last_altitude: f32,
}

impl AscentGuard {
    pub fn new(altitude: f32) -> Self {
        Self {
            last_altitude: altitude,
        }
    }

    /// True when `altitude` is strictly above the previous sample. Always records it.
    pub fn is_ascending(&mut self, altitude: f32) -> bool {
        let ascending = altitude > self.last_altitude;
        self.last_altitude = altitude;
        ascending
    }
}

/// Force accumulated for the current physics step
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Deref, DerefMut)]
pub struct MovementForce(pub Vec3);

/// Everything the state cascade looks at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateInputs {
    pub grounded: bool,
    pub sliding: bool,
    pub crouch_held: bool,
    pub posture: Posture,
    pub sprint_held: bool,
    pub forward_held: bool,
    pub move_axes: Vec2,
    /// State carried over from the previous frame
    pub previous: MovementState,
}

/// Derives the movement state by priority, first match wins.
///
/// Returns the state and, when the state assigns one, its target speed.
/// Idle and Airborne leave the target speed untouched.
pub fn derive_state(inputs: &StateInputs, config: &PlayerConfig) -> (MovementState, Option<f32>) {
    let moving = inputs.move_axes.x != 0.0 || inputs.move_axes.y != 0.0;

    if !inputs.grounded {
        (MovementState::Airborne, None)
    } else if inputs.sliding {
        (MovementState::Sliding, None)
    } else if inputs.crouch_held || inputs.posture == Posture::Crouched {
        (MovementState::Crouching, Some(config.crouch_speed))
    } else if inputs.previous != MovementState::Crouching
        && inputs.sprint_held
        && moving
        && inputs.forward_held
    {
        // Sprinting needs the forward key itself, not just a forward axis
        (MovementState::Sprinting, Some(config.sprint_speed))
    } else if moving {
        (MovementState::Walking, Some(config.walk_speed))
    } else {
        (MovementState::Idle, None)
    }
}
