use avian3d::prelude::*;
use bevy::prelude::*;

use super::input::{InputIntent, PlayerIntent};
use super::state::*;
use crate::physics::SlopeInfo;

/// Decides the posture for a grounded frame and starts slides.
///
/// A granted slide crouches immediately and arms the session. Crouch held,
/// or an ongoing slide, keeps the player crouched. Otherwise the player
/// stands unless `ceiling_blocked` reports no room overhead, in which case
/// the posture is left as it is.
pub fn resolve_posture(
    current: Posture,
    intent: &InputIntent,
    state: MovementState,
    slide: &mut SlideSession,
    config: &PlayerConfig,
    ceiling_blocked: impl FnOnce() -> bool,
) -> Posture {
    if intent.slide_requested && slide.try_start(config.max_slide_time, config.slide_cooldown) {
        debug!("slide started for {:.2}s", config.max_slide_time);
        Posture::Crouched
    } else if intent.crouch_held || state == MovementState::Sliding {
        Posture::Crouched
    } else if !ceiling_blocked() {
        Posture::Standing
    } else {
        current
    }
}

/// Updates posture and slide initiation from the gated intent.
///
/// Posture only changes while grounded.
pub fn update_posture(
    spatial_query: SpatialQuery,
    mut query: Query<
        (
            Entity,
            &PlayerConfig,
            &Position,
            &PlayerIntent,
            &MovementState,
            &SlopeInfo,
            &mut SlideSession,
            &mut Posture,
        ),
        With<Player>,
    >,
) {
    for (entity, config, position, intent, state, slope, mut slide, mut posture) in &mut query {
        if !slope.grounded {
            continue;
        }

        let next = resolve_posture(*posture, intent, *state, &mut slide, config, || {
            ceiling_blocks_standing(&spatial_query, entity, position.0, config)
        });
        posture.set_if_neq(next);
    }
}

/// Checks for geometry overhead that leaves no room to stand up
fn ceiling_blocks_standing(
    spatial_query: &SpatialQuery,
    entity: Entity,
    position: Vec3,
    config: &PlayerConfig,
) -> bool {
    let check_shape = Collider::sphere(config.radius);

    let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);

    let cast_config = ShapeCastConfig {
        max_distance: config.stand_height * 0.5,
        ignore_origin_penetration: true,
        ..default()
    };

    spatial_query
        .cast_shape(&check_shape, position, Quat::IDENTITY, Dir3::Y, &cast_config, &filter)
        .is_some()
}

/// Advances the slide restart gate
pub fn tick_slide_gate(mut query: Query<&mut SlideSession, With<Player>>, time: Res<Time>) {
    let dt = time.delta_secs();
    for mut slide in &mut query {
        if !slide.ready_to_restart {
            slide.tick_restart(dt);
        }
    }
}

/// Updates collider height based on posture
pub fn update_collider_height(
    mut query: Query<(&PlayerConfig, &Posture, &mut Collider), (With<Player>, Changed<Posture>)>,
) {
    for (config, posture, mut collider) in &mut query {
        let target_height = config.height_for(*posture);

        // Create new capsule with target height
        let capsule_height = target_height - config.radius * 2.0;
        *collider = Collider::capsule(config.radius, capsule_height.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{headless_physics_app, settle};

    fn slide_intent() -> InputIntent {
        InputIntent {
            move_axes: Vec2::Y,
            slide_requested: true,
            crouch_held: true,
            ..Default::default()
        }
    }

    #[test]
    fn granted_slide_snaps_to_crouch_and_arms_timer() {
        let config = PlayerConfig::default();
        let mut slide = SlideSession::default();

        let posture = resolve_posture(
            Posture::Standing,
            &slide_intent(),
            MovementState::Sprinting,
            &mut slide,
            &config,
            || false,
        );

        assert_eq!(posture, Posture::Crouched);
        assert_eq!(config.height_for(posture), config.crouch_height);
        assert!(slide.active);
        assert_eq!(slide.time_remaining, config.max_slide_time);
        assert!(!slide.ready_to_restart);
        assert_eq!(slide.restart_remaining, config.max_slide_time + config.slide_cooldown);
    }

    #[test]
    fn slide_on_cooldown_falls_back_to_plain_crouch() {
        let config = PlayerConfig::default();
        let mut slide = SlideSession {
            ready_to_restart: false,
            restart_remaining: 0.5,
            ..Default::default()
        };

        let posture = resolve_posture(
            Posture::Standing,
            &slide_intent(),
            MovementState::Sprinting,
            &mut slide,
            &config,
            || false,
        );

        assert_eq!(posture, Posture::Crouched);
        assert!(!slide.active);
    }

    #[test]
    fn sliding_state_keeps_crouch_after_release() {
        let config = PlayerConfig::default();
        let mut slide = SlideSession::default();
        let posture = resolve_posture(
            Posture::Crouched,
            &InputIntent::default(),
            MovementState::Sliding,
            &mut slide,
            &config,
            || false,
        );
        assert_eq!(posture, Posture::Crouched);
    }

    #[test]
    fn low_ceiling_forces_crouch() {
        let config = PlayerConfig::default();
        let mut slide = SlideSession::default();
        let posture = resolve_posture(
            Posture::Crouched,
            &InputIntent::default(),
            MovementState::Crouching,
            &mut slide,
            &config,
            || true,
        );
        assert_eq!(posture, Posture::Crouched);

        let posture = resolve_posture(
            Posture::Crouched,
            &InputIntent::default(),
            MovementState::Crouching,
            &mut slide,
            &config,
            || false,
        );
        assert_eq!(posture, Posture::Standing);
    }

    #[test]
    fn ceiling_is_only_checked_when_standing_up() {
        let config = PlayerConfig::default();
        let mut slide = SlideSession::default();
        let intent = InputIntent {
            crouch_held: true,
            ..Default::default()
        };
        resolve_posture(
            Posture::Standing,
            &intent,
            MovementState::Walking,
            &mut slide,
            &config,
            || panic!("ceiling checked while crouch is held"),
        );
    }

    fn spawn_crouched(app: &mut App, position: Vec3) -> Entity {
        app.world_mut()
            .spawn((
                Player,
                PlayerConfig::default(),
                Position(position),
                PlayerIntent::default(),
                MovementState::Crouching,
                SlopeInfo {
                    grounded: true,
                    normal: Vec3::Y,
                    angle: 0.0,
                },
                SlideSession::default(),
                Posture::Crouched,
            ))
            .id()
    }

    #[test]
    fn slab_overhead_keeps_player_crouched() {
        let mut app = headless_physics_app();
        app.world_mut().spawn((
            RigidBody::Static,
            Collider::cuboid(4.0, 0.5, 4.0),
            Transform::from_xyz(0.0, 1.8, 0.0),
        ));
        settle(&mut app);

        app.add_systems(Update, update_posture);
        // Crouched center sits at half the crouch height
        let under_slab = spawn_crouched(&mut app, Vec3::new(0.0, 0.5, 0.0));
        let in_the_open = spawn_crouched(&mut app, Vec3::new(10.0, 0.5, 0.0));
        app.update();

        let world = app.world();
        assert_eq!(world.get::<Posture>(under_slab), Some(&Posture::Crouched));
        assert_eq!(world.get::<Posture>(in_the_open), Some(&Posture::Standing));
    }

    #[test]
    fn collider_follows_posture_height() {
        let mut app = headless_physics_app();
        app.add_systems(Update, update_collider_height);

        let config = PlayerConfig::default().with_heights(2.0, 1.4);
        let entity = app
            .world_mut()
            .spawn((
                Player,
                config,
                Posture::Standing,
                Collider::capsule(config.radius, 0.0),
            ))
            .id();

        let total_height = |app: &App| {
            app.world()
                .get::<Collider>(entity)
                .and_then(|collider| {
                    let capsule = collider.shape().as_capsule()?;
                    Some(capsule.half_height() * 2.0 + capsule.radius * 2.0)
                })
                .unwrap_or_default()
        };

        app.update();
        assert!((total_height(&app) - config.stand_height).abs() < 1e-4);

        if let Some(mut posture) = app.world_mut().get_mut::<Posture>(entity) {
            *posture = Posture::Crouched;
        }
        app.update();
        assert!((total_height(&app) - config.crouch_height).abs() < 1e-4);
    }
}
