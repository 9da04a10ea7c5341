use crate::ecs::{Vec2, DEFAULT_AI_SPEED};

/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_TOLERANCE: f32 = 4.0;

/// Behavior override, then controller speed, then [`DEFAULT_AI_SPEED`].
pub fn speed_for(behavior_speed: f32, controller_speed: f32) -> f32 {
    if behavior_speed > 0.0 {
        behavior_speed
    } else if controller_speed > 0.0 {
        controller_speed
    } else {
        DEFAULT_AI_SPEED
    }
}

/// Unit direction of `delta` scaled by `min(speed, |delta|)` so one step never overshoots.
pub fn directional_velocity(delta: Vec2, speed: f32) -> Vec2 {
    let distance = delta.length();
    if distance == 0.0 || speed <= 0.0 || !distance.is_finite() {
        return Vec2::ZERO;
    }
    let step = speed.min(distance);
    Vec2::new(delta.x / distance * step, delta.y / distance * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_prefers_behavior_then_controller_then_default() {
        assert_eq!(speed_for(4.0, 1.0), 4.0);
        assert_eq!(speed_for(0.0, 1.0), 1.0);
        assert_eq!(speed_for(-2.0, 0.0), DEFAULT_AI_SPEED);
    }

    #[test]
    fn velocity_is_capped_at_remaining_distance() {
        let far = directional_velocity(Vec2::new(30.0, 40.0), 5.0);
        assert!((far.x - 3.0).abs() < 1e-5);
        assert!((far.y - 4.0).abs() < 1e-5);

        let near = directional_velocity(Vec2::new(1.0, 0.0), 5.0);
        assert_eq!(near, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn zero_delta_or_speed_yields_zero() {
        assert_eq!(directional_velocity(Vec2::ZERO, 3.0), Vec2::ZERO);
        assert_eq!(directional_velocity(Vec2::new(3.0, 0.0), 0.0), Vec2::ZERO);
        assert_eq!(directional_velocity(Vec2::new(3.0, 0.0), -1.0), Vec2::ZERO);
    }
}
