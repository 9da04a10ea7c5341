use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::ecs::{
    AiController, Camera, DrawContext, PathBehavior, Position, System, UpdateContext, Vec2,
    Velocity,
};
use crate::events::DebugToggleEvent;
use crate::render::{CameraView, Rgba, Surface, Viewport};

const VELOCITY_COLOR: Rgba = [255, 120, 120, 255];
const PATROL_COLOR: Rgba = [80, 220, 255, 255];
const TRAVEL_COLOR: Rgba = [255, 210, 70, 255];
const WAYPOINT_HALF_SIZE_PX: i32 = 2;
/// Velocity is per tick; stretch it so the vector is visible.
const VELOCITY_VECTOR_SCALE: f32 = 10.0;

/// Draws AI velocity vectors and path waypoints while enabled.
#[derive(Debug)]
pub struct DebugOverlaySystem {
    enabled: Arc<AtomicBool>,
    subscribed: bool,
}

impl DebugOverlaySystem {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
            subscribed: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl Default for DebugOverlaySystem {
    fn default() -> Self {
        Self::new(false)
    }
}

impl System for DebugOverlaySystem {
    fn name(&self) -> &'static str {
        "debug_overlay"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.subscribed {
            return;
        }
        self.subscribed = true;
        let enabled = Arc::clone(&self.enabled);
        ctx.events.subscribe(move |event: &DebugToggleEvent| {
            enabled.store(event.enabled, Ordering::Release);
            info!(enabled = event.enabled, "debug_overlay_toggled");
        });
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        if !self.is_enabled() {
            return;
        }
        let (width, height) = surface.size();
        let viewport = Viewport::new(width, height);
        let view = ctx
            .entities
            .first_component::<Camera>()
            .map(|(_, camera)| CameraView::new(camera, viewport))
            .unwrap_or_else(|| CameraView::fallback(viewport));

        for entity in ctx.entities.entities() {
            let (Some(position), Some(controller)) =
                (entity.get::<Position>(), entity.get::<AiController>())
            else {
                continue;
            };
            if let Some(patrol) = &controller.patrol {
                draw_path(surface, &view, patrol, PATROL_COLOR);
            }
            if let Some(travel) = &controller.travel {
                draw_path(surface, &view, travel, TRAVEL_COLOR);
            }
            if let Some(velocity) = entity.get::<Velocity>().filter(|v| !v.is_zero()) {
                let start = position.as_vec2();
                let end = start.add(Vec2::new(velocity.vx, velocity.vy).scale(VELOCITY_VECTOR_SCALE));
                let (x0, y0) = view.world_to_screen_px(start);
                let (x1, y1) = view.world_to_screen_px(end);
                surface.draw_line(x0, y0, x1, y1, VELOCITY_COLOR);
            }
        }
    }
}

fn draw_path(surface: &mut dyn Surface, view: &CameraView, path: &PathBehavior, color: Rgba) {
    let points: Vec<(i32, i32)> = path
        .waypoints
        .iter()
        .map(|waypoint| view.world_to_screen_px(*waypoint))
        .collect();
    for pair in points.windows(2) {
        surface.draw_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
    }
    for &(x, y) in &points {
        surface.fill_square(x, y, WAYPOINT_HALF_SIZE_PX, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{DrawLayer, EntityStore, PathVariant, SystemDescriptor, World};
    use crate::render::FrameSurface;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn scene(entities: &mut EntityStore) {
        let mut controller = AiController::default();
        controller.set_patrol(PathBehavior {
            variant: PathVariant::Loop,
            waypoints: vec![Vec2::new(-10.0, -10.0), Vec2::new(10.0, -10.0)],
            speed: 1.0,
        });
        entities
            .new_entity()
            .insert(Position::new(0.0, 0.0))
            .insert(Velocity::new(1.0, 0.0))
            .insert(controller);
    }

    #[test]
    fn toggle_event_enables_drawing_after_flush() {
        let mut world = World::new();
        world.add_system(
            Box::new(DebugOverlaySystem::new(false)),
            SystemDescriptor::new().on_layer(DrawLayer::DEBUG),
        );
        scene(world.entities_mut());
        world.update();

        let mut frame = vec![0u8; 60 * 60 * 4];
        world.draw_overlay(&mut FrameSurface::new(&mut frame, 60, 60));
        assert!(frame.iter().all(|&byte| byte == 0));

        world.events().queue(DebugToggleEvent { enabled: true });
        world.update();
        world.draw_overlay(&mut FrameSurface::new(&mut frame, 60, 60));

        // Velocity vector starts at the viewport center and points right.
        assert_eq!(pixel(&frame, 60, 30, 30), VELOCITY_COLOR);
        assert_eq!(pixel(&frame, 60, 40, 30), VELOCITY_COLOR);
        // Waypoints at (-10, -10) and (10, -10).
        assert_eq!(pixel(&frame, 60, 20, 20), PATROL_COLOR);
        assert_eq!(pixel(&frame, 60, 40, 20), PATROL_COLOR);
    }
}
