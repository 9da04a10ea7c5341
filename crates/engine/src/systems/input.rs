use crate::ecs::{PlayerInput, System, UpdateContext, Velocity};
use crate::input::{InputAction, InputSnapshot};

pub const DEFAULT_PLAYER_SPEED: f32 = 2.0;

/// Drives the enabled `PlayerInput` entity from the host's input snapshot.
#[derive(Debug, Clone)]
pub struct InputSystem {
    speed: f32,
}

impl InputSystem {
    pub fn new() -> Self {
        Self {
            speed: DEFAULT_PLAYER_SPEED,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InputSystem {
    fn name(&self) -> &'static str {
        "input"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let velocity = velocity_for(ctx.input, self.speed);
        for entity in ctx.entities.entities_mut() {
            if entity.get::<PlayerInput>().is_some_and(|input| input.enabled) {
                entity.set(velocity);
            }
        }
    }
}

fn velocity_for(input: &InputSnapshot, speed: f32) -> Velocity {
    let axis = |negative: InputAction, positive: InputAction| {
        match (input.is_down(negative), input.is_down(positive)) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0.0,
        }
    };
    Velocity::new(
        axis(InputAction::MoveLeft, InputAction::MoveRight),
        axis(InputAction::MoveUp, InputAction::MoveDown),
    )
}
