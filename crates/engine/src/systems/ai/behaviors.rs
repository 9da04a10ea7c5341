//! Target-relative steering behaviors. Each returns `Some(velocity)` when it
//! claims control of the entity for this update and `None` to defer.

use crate::ecs::{FollowBehavior, PursueBehavior, RetreatBehavior, Vec2};

use super::steering::{directional_velocity, speed_for};

pub const DEFAULT_RETREAT_TRIGGER: f32 = 150.0;
const SAFE_DISTANCE_FACTOR: f32 = 1.25;

/// `(trigger, safe)` after defaults: trigger falls back to 150, safe is pushed
/// past the trigger when configured at or below it.
pub fn retreat_thresholds(behavior: &RetreatBehavior) -> (f32, f32) {
    let trigger = if behavior.trigger_distance <= 0.0 {
        DEFAULT_RETREAT_TRIGGER
    } else {
        behavior.trigger_distance
    };
    let safe = if behavior.safe_distance <= trigger {
        trigger * SAFE_DISTANCE_FACTOR
    } else {
        behavior.safe_distance
    };
    (trigger, safe)
}

/// Flees inside the trigger distance and keeps fleeing until the safe distance
/// is reached, even after leaving the trigger radius.
pub fn retreat(
    behavior: &RetreatBehavior,
    retreating: &mut bool,
    position: Vec2,
    target: Vec2,
    controller_speed: f32,
) -> Option<Vec2> {
    let (trigger, safe) = retreat_thresholds(behavior);
    let away = position.sub(target);
    let distance = away.length();

    if distance >= safe {
        *retreating = false;
        return Some(Vec2::ZERO);
    }
    if distance < trigger {
        *retreating = true;
    } else if !*retreating {
        return None;
    }
    Some(directional_velocity(
        away,
        speed_for(behavior.speed, controller_speed),
    ))
}

pub fn pursue(
    behavior: &PursueBehavior,
    position: Vec2,
    target: Vec2,
    controller_speed: f32,
) -> Option<Vec2> {
    let delta = target.sub(position);
    if behavior.engage_distance > 0.0 && delta.length() > behavior.engage_distance {
        return None;
    }
    Some(directional_velocity(
        delta,
        speed_for(behavior.speed, controller_speed),
    ))
}

/// Eases toward `target + offset`, slowing linearly from `max_distance` down to
/// a stop at `min_distance`.
pub fn follow(
    behavior: &FollowBehavior,
    position: Vec2,
    target: Vec2,
    controller_speed: f32,
) -> Option<Vec2> {
    let desired = target.add(Vec2::new(behavior.offset_x, behavior.offset_y));
    let delta = desired.sub(position);
    let distance = delta.length();
    if distance <= behavior.min_distance {
        return Some(Vec2::ZERO);
    }

    let factor = if behavior.max_distance > behavior.min_distance {
        ((distance - behavior.min_distance) / (behavior.max_distance - behavior.min_distance))
            .clamp(0.0, 1.0)
    } else {
        1.0
    };
    let speed = speed_for(behavior.speed, controller_speed) * factor;
    Some(directional_velocity(delta, speed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::DEFAULT_AI_SPEED;

    fn retreat_from(trigger: f32, safe: f32) -> RetreatBehavior {
        RetreatBehavior {
            target: "player".to_string(),
            trigger_distance: trigger,
            safe_distance: safe,
            speed: 2.0,
        }
    }

    #[test]
    fn retreat_thresholds_apply_defaults() {
        assert_eq!(retreat_thresholds(&retreat_from(0.0, 0.0)), (150.0, 187.5));
        assert_eq!(retreat_thresholds(&retreat_from(100.0, 90.0)), (100.0, 125.0));
        assert_eq!(retreat_thresholds(&retreat_from(100.0, 300.0)), (100.0, 300.0));
    }

    #[test]
    fn retreat_flees_inside_trigger_and_away_from_target() {
        let behavior = retreat_from(100.0, 200.0);
        let mut retreating = false;
        let velocity = retreat(
            &behavior,
            &mut retreating,
            Vec2::new(50.0, 0.0),
            Vec2::ZERO,
            0.0,
        )
        .expect("claims");

        assert!(retreating);
        assert_eq!(velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn retreat_between_trigger_and_safe_depends_on_prior_state() {
        let behavior = retreat_from(100.0, 200.0);
        let position = Vec2::new(150.0, 0.0);

        let mut idle = false;
        assert_eq!(
            retreat(&behavior, &mut idle, position, Vec2::ZERO, 0.0),
            None
        );
        assert!(!idle);

        let mut fleeing = true;
        let velocity =
            retreat(&behavior, &mut fleeing, position, Vec2::ZERO, 0.0).expect("keeps fleeing");
        assert!(velocity.x > 0.0);
        assert!(fleeing);
    }

    #[test]
    fn retreat_parks_once_safe() {
        let behavior = retreat_from(100.0, 200.0);
        let mut retreating = true;
        assert_eq!(
            retreat(
                &behavior,
                &mut retreating,
                Vec2::new(0.0, 250.0),
                Vec2::ZERO,
                0.0
            ),
            Some(Vec2::ZERO)
        );
        assert!(!retreating);
    }

    #[test]
    fn pursue_respects_engage_distance() {
        let behavior = PursueBehavior {
            target: "player".to_string(),
            engage_distance: 100.0,
            speed: 4.0,
        };
        assert_eq!(
            pursue(&behavior, Vec2::ZERO, Vec2::new(200.0, 0.0), 0.0),
            None
        );
        assert_eq!(
            pursue(&behavior, Vec2::ZERO, Vec2::new(60.0, 0.0), 0.0),
            Some(Vec2::new(4.0, 0.0))
        );

        let unlimited = PursueBehavior {
            engage_distance: 0.0,
            ..behavior
        };
        assert!(pursue(&unlimited, Vec2::ZERO, Vec2::new(5000.0, 0.0), 0.0).is_some());
    }

    #[test]
    fn pursue_never_overshoots_target() {
        let behavior = PursueBehavior {
            speed: 10.0,
            ..PursueBehavior::default()
        };
        assert_eq!(
            pursue(&behavior, Vec2::ZERO, Vec2::new(0.0, 3.0), 0.0),
            Some(Vec2::new(0.0, 3.0))
        );
    }

    #[test]
    fn follow_stops_inside_min_distance_and_eases_between() {
        let behavior = FollowBehavior {
            target: "leader".to_string(),
            offset_x: -10.0,
            offset_y: 0.0,
            min_distance: 20.0,
            max_distance: 120.0,
            speed: 0.0,
        };
        let leader = Vec2::new(110.0, 0.0);

        assert_eq!(
            follow(&behavior, Vec2::new(90.0, 0.0), leader, 0.0),
            Some(Vec2::ZERO)
        );

        let halfway = follow(&behavior, Vec2::new(30.0, 0.0), leader, 0.0).expect("claims");
        assert!((halfway.x - DEFAULT_AI_SPEED * 0.5).abs() < 1e-5);

        let far = follow(&behavior, Vec2::new(-500.0, 0.0), leader, 0.0).expect("claims");
        assert!((far.x - DEFAULT_AI_SPEED).abs() < 1e-5);
    }

    #[test]
    fn follow_without_easing_band_uses_full_speed() {
        let behavior = FollowBehavior {
            min_distance: 5.0,
            max_distance: 5.0,
            speed: 3.0,
            ..FollowBehavior::default()
        };
        let velocity = follow(&behavior, Vec2::ZERO, Vec2::new(0.0, 50.0), 1.0).expect("claims");
        assert_eq!(velocity, Vec2::new(0.0, 3.0));
    }
}
