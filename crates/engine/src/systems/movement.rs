use std::f32::consts::FRAC_PI_2;

use crate::ecs::{Position, Sprite, System, UpdateContext, Velocity};
use crate::events::EntityMovedEvent;

/// Integrates velocity into position once per tick.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        for entity in ctx.entities.entities_mut() {
            let Some(velocity) = entity.get::<Velocity>().copied() else {
                continue;
            };
            if velocity.is_zero() {
                continue;
            }
            let Some(position) = entity.get_mut::<Position>() else {
                continue;
            };
            position.x += velocity.vx;
            position.y += velocity.vy;
            let moved = *position;

            // Sprite art faces up.
            if let Some(sprite) = entity.get_mut::<Sprite>() {
                sprite.rotation = velocity.vy.atan2(velocity.vx) + FRAC_PI_2;
            }
            ctx.events.queue(EntityMovedEvent {
                entity: entity.id(),
                position: moved,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ecs::{SystemDescriptor, World};

    #[test]
    fn moving_entities_step_rotate_and_report_at_flush() {
        let mut world = World::new();
        world.add_system(Box::new(MovementSystem::new()), SystemDescriptor::new());
        let moved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&moved);
        world.events().subscribe(move |event: &EntityMovedEvent| {
            if let Ok(mut moved) = sink.lock() {
                moved.push(*event);
            }
        });

        let ship = {
            let entity = world.new_entity();
            entity
                .insert(Position::new(10.0, 10.0))
                .insert(Velocity::new(0.0, 3.0))
                .insert(Sprite::default());
            entity.id()
        };
        let parked = {
            let entity = world.new_entity();
            entity
                .insert(Position::new(0.0, 0.0))
                .insert(Velocity::new(0.0, 0.0));
            entity.id()
        };

        world.update();

        let entity = world.entity(ship).expect("ship");
        assert_eq!(entity.get::<Position>(), Some(&Position::new(10.0, 13.0)));
        let rotation = entity.get::<Sprite>().map(|s| s.rotation).expect("sprite");
        assert!((rotation - std::f32::consts::PI).abs() < 1e-5);

        let moved = moved.lock().map(|m| m.clone()).unwrap_or_default();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].entity, ship);
        assert_eq!(moved[0].position, Position::new(10.0, 13.0));
        assert_eq!(
            world.entity(parked).and_then(|e| e.get::<Position>()),
            Some(&Position::new(0.0, 0.0))
        );
    }
}
