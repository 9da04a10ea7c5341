use rand::Rng;

use crate::ecs::{PathBehavior, PathState, PathVariant, Vec2};

use super::steering::{directional_velocity, speed_for, WAYPOINT_TOLERANCE};

/// Steps `state` toward the next waypoint of `path`. Returns `None` for an empty
/// route, otherwise the velocity for this update.
pub fn follow_path<R: Rng>(
    path: &PathBehavior,
    state: &mut PathState,
    position: Vec2,
    controller_speed: f32,
    rng: &mut R,
) -> Option<Vec2> {
    let total = path.waypoints.len();
    if total == 0 {
        return None;
    }
    if state.index >= total {
        state.index %= total;
    }
    if total == 1 && matches!(path.variant, PathVariant::PingPong | PathVariant::Random) {
        state.completed = true;
    }
    if path.variant == PathVariant::Once && state.completed {
        return Some(Vec2::ZERO);
    }

    let mut delta = path.waypoints[state.index].sub(position);
    if delta.length() <= WAYPOINT_TOLERANCE {
        advance(path.variant, state, total, rng);
        if path.variant == PathVariant::Once && state.completed {
            return Some(Vec2::ZERO);
        }
        delta = path.waypoints[state.index].sub(position);
    }

    Some(directional_velocity(
        delta,
        speed_for(path.speed, controller_speed),
    ))
}

/// Applies one arrival to `state` according to `variant`.
pub fn advance<R: Rng>(
    variant: PathVariant,
    state: &mut PathState,
    total: usize,
    rng: &mut R,
) {
    if total == 0 {
        return;
    }
    match variant {
        PathVariant::Loop => state.index = (state.index + 1) % total,
        PathVariant::PingPong => {
            if total == 1 {
                state.completed = true;
            } else if !state.forward {
                if state.index == 0 {
                    state.forward = true;
                    state.index = 1;
                } else {
                    state.index -= 1;
                }
            } else if state.index >= total - 1 {
                state.forward = false;
                state.index = total - 2;
            } else {
                state.index += 1;
            }
        }
        PathVariant::Once => {
            if state.index >= total - 1 {
                state.completed = true;
            } else {
                state.index += 1;
            }
        }
        PathVariant::Random => {
            if total > 1 {
                let current = state.index;
                let mut next = current;
                while next == current {
                    next = rng.random_range(0..total);
                }
                state.index = next;
            } else {
                state.completed = true;
            }
        }
    }
}
