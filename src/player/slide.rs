use bevy::prelude::*;

use super::state::{AscentGuard, PlayerConfig, SlideSession};
use crate::physics::SlopeInfo;

/// Vertical speed at or above which a slide is not considered to be falling
pub const FALLING_THRESHOLD: f32 = -0.1;

/// Slide force scale when pushing uphill
pub const UPHILL_SLIDE_FACTOR: f32 = 0.4;

/// Which slide push applies this step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideBranch {
    /// Flat ground, or not meaningfully falling: full push, timer runs
    Level,
    /// On a slope and rising: weak push, timer runs
    Uphill,
    /// On a slope and falling: push along the surface, timer stalls
    Downhill,
}

/// Picks the slide branch.
///
/// The ascent guard is only sampled once the level branch is ruled out.
pub fn select_branch(
    on_slope: bool,
    vertical_velocity: f32,
    guard: &mut AscentGuard,
    altitude: f32,
) -> SlideBranch {
    if !on_slope || vertical_velocity >= FALLING_THRESHOLD {
        SlideBranch::Level
    } else if guard.is_ascending(altitude) {
        SlideBranch::Uphill
    } else {
        SlideBranch::Downhill
    }
}

/// Applies one fixed step of slide physics and returns the force to add.
///
/// The downhill branch does not spend slide time, so a slide that keeps
/// falling down a slope does not end on its own.
#[allow(clippy::too_many_arguments)]
pub fn slide_force(
    session: &mut SlideSession,
    guard: &mut AscentGuard,
    direction: Vec3,
    slope: &SlopeInfo,
    config: &PlayerConfig,
    vertical_velocity: f32,
    altitude: f32,
    dt: f32,
) -> Vec3 {
    let on_slope = slope.on_walkable_slope(config.max_slope_angle);
    let branch = select_branch(on_slope, vertical_velocity, guard, altitude);

    let force = match branch {
        SlideBranch::Level => {
            session.time_remaining -= dt;
            direction.normalize_or_zero() * config.slide_force
        }
        SlideBranch::Uphill => {
            session.time_remaining -= dt;
            direction.normalize_or_zero() * config.slide_force * UPHILL_SLIDE_FACTOR
        }
        SlideBranch::Downhill => slope.project(direction) * config.slide_force,
    };

    session.end_if_expired();
    if !session.active {
        debug!("slide ended");
    }

    force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::GroundHit;

    const DT: f32 = 1.0 / 64.0;

    fn slope(degrees: f32) -> SlopeInfo {
        SlopeInfo::from_hit(Some(GroundHit {
            normal: Quat::from_rotation_x(degrees.to_radians()) * Vec3::Y,
        }))
    }

    fn flat() -> SlopeInfo {
        slope(0.0)
    }

    fn started(config: &PlayerConfig) -> SlideSession {
        let mut session = SlideSession::default();
        assert!(session.try_start(config.max_slide_time, config.slide_cooldown));
        session
    }

    #[test]
    fn level_slide_spends_time_and_ends() {
        let config = PlayerConfig::default();
        let mut session = started(&config);
        let mut guard = AscentGuard::default();

        let force = slide_force(
            &mut session,
            &mut guard,
            Vec3::NEG_Z * 3.0,
            &flat(),
            &config,
            0.0,
            1.0,
            DT,
        );
        assert!((force - Vec3::NEG_Z * config.slide_force).length() < 1e-3);
        assert!((session.time_remaining - (config.max_slide_time - DT)).abs() < 1e-6);

        let steps = (config.max_slide_time / DT).ceil() as usize;
        for _ in 0..steps {
            let ground = flat();
            slide_force(&mut session, &mut guard, Vec3::NEG_Z, &ground, &config, 0.0, 1.0, DT);
        }
        assert!(!session.active);
    }

    #[test]
    fn rising_on_slope_is_level_branch() {
        let mut guard = AscentGuard::default();
        assert_eq!(select_branch(true, 0.5, &mut guard, 1.0), SlideBranch::Level);
        assert_eq!(select_branch(true, -0.1, &mut guard, 1.0), SlideBranch::Level);
        // The guard was not sampled
        assert_eq!(guard.last_altitude, 0.0);
    }

    #[test]
    fn just_below_falling_threshold_samples_the_guard() {
        let mut guard = AscentGuard::default();
        assert_eq!(select_branch(true, -0.11, &mut guard, 1.0), SlideBranch::Uphill);
        assert_eq!(guard.last_altitude, 1.0);
        assert_eq!(select_branch(true, -0.11, &mut guard, 0.5), SlideBranch::Downhill);
    }

    #[test]
    fn falling_but_ascending_is_weak_uphill_push() {
        let config = PlayerConfig::default();
        let mut session = started(&config);
        let mut guard = AscentGuard::new(1.0);

        let ground = slope(20.0);
        let force = slide_force(
            &mut session,
            &mut guard,
            Vec3::NEG_Z,
            &ground,
            &config,
            -0.5,
            1.2,
            DT,
        );
        assert!((force.length() - config.slide_force * UPHILL_SLIDE_FACTOR).abs() < 1e-3);
        assert!(session.time_remaining < config.max_slide_time);
    }

    #[test]
    fn slide_session_duration_is_unbounded_in_descending_branch() {
        // Flagged behaviour: the downhill branch never spends slide time.
        let config = PlayerConfig::default();
        let mut session = started(&config);
        let mut guard = AscentGuard::new(10.0);
        let ground = slope(25.0);

        let mut altitude = 10.0;
        for _ in 0..1000 {
            altitude -= 0.05;
            let force = slide_force(
                &mut session,
                &mut guard,
                Vec3::Z,
                &ground,
                &config,
                -3.0,
                altitude,
                DT,
            );
            assert!(force.dot(ground.normal).abs() < 1e-2);
        }

        assert!(session.active);
        assert_eq!(session.time_remaining, config.max_slide_time);
    }
}
