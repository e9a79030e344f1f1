use avian3d::prelude::*;
use bevy::prelude::*;

use super::GameLayer;

/// Fraction of the collider radius used for the ground cast sphere
pub const GROUND_CAST_RADIUS_FACTOR: f32 = 0.9;

/// Extra distance below the collider's half height that still counts as ground
pub const GROUND_CAST_EXTRA_DISTANCE: f32 = 0.1;

/// Result of a ground cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub normal: Vec3,
}

/// Per-frame ground classification for a character.
///
/// Rebuilt every frame by the ground classifier and read by the state machine
/// and the force model within the same frame. When `grounded` is false the
/// `normal` and `angle` carry no meaning.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct SlopeInfo {
    pub grounded: bool,
    /// Surface normal under the character
    pub normal: Vec3,
    /// Angle between world up and `normal`, in degrees (0 = flat)
    pub angle: f32,
}

impl Default for SlopeInfo {
    fn default() -> Self {
        Self::AIRBORNE
    }
}

impl SlopeInfo {
    pub const AIRBORNE: Self = Self {
        grounded: false,
        normal: Vec3::Y,
        angle: 0.0,
    };

    /// Classifies the result of a ground cast.
    pub fn from_hit(hit: Option<GroundHit>) -> Self {
        match hit {
            Some(hit) => Self {
                grounded: true,
                normal: hit.normal,
                angle: Vec3::Y.angle_between(hit.normal).to_degrees(),
            },
            None => Self::AIRBORNE,
        }
    }

    /// Grounded on an incline strictly between flat and `max_slope_angle` (degrees).
    ///
    /// A perfectly flat surface is not a slope.
    pub fn on_walkable_slope(&self, max_slope_angle: f32) -> bool {
        self.grounded && self.angle > 0.0 && self.angle < max_slope_angle
    }

    /// Projects `direction` onto the surface plane and normalizes it.
    pub fn project(&self, direction: Vec3) -> Vec3 {
        project_on_plane(direction, self.normal).normalize_or_zero()
    }
}

/// Removes the component of `vector` along `normal`.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    vector - normal * vector.dot(normal)
}

/// Casts a sphere straight down from the character's center against the ground layer.
pub fn detect_ground(
    spatial_query: &SpatialQuery,
    origin: Vec3,
    collider_radius: f32,
    collider_half_height: f32,
) -> Option<GroundHit> {
    let cast_shape = Collider::sphere(collider_radius * GROUND_CAST_RADIUS_FACTOR);

    let filter = SpatialQueryFilter::default().with_mask(GameLayer::Ground);

    let config = ShapeCastConfig {
        max_distance: collider_half_height + GROUND_CAST_EXTRA_DISTANCE,
        ignore_origin_penetration: true,
        ..default()
    };

    spatial_query
        .cast_shape(
            &cast_shape,
            origin,
            Quat::IDENTITY,
            Dir3::NEG_Y,
            &config,
            &filter,
        )
        .map(|hit| GroundHit {
            normal: hit.normal1,
        })
}

/// Casts for and classifies the ground beneath a character in one step
pub fn classify(
    spatial_query: &SpatialQuery,
    origin: Vec3,
    collider_radius: f32,
    collider_half_height: f32,
) -> SlopeInfo {
    SlopeInfo::from_hit(detect_ground(
        spatial_query,
        origin,
        collider_radius,
        collider_half_height,
    ))
}
