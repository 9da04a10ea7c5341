use crate::ecs::{Camera, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn center(self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

/// World-to-screen mapping for one draw pass. World units are pixels at scale 1,
/// y grows downward, and the camera position lands on the viewport center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec2,
    pub scale: f32,
    pub rotation: f32,
    pub viewport: Viewport,
}

impl CameraView {
    pub fn new(camera: &Camera, viewport: Viewport) -> Self {
        Self {
            position: camera.position,
            scale: camera.effective_scale(),
            rotation: camera.rotation,
            viewport,
        }
    }

    /// Identity view centered on the world origin; used when no camera entity exists.
    pub fn fallback(viewport: Viewport) -> Self {
        Self::new(&Camera::default(), viewport)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let relative = world.sub(self.position);
        let (sin, cos) = (-self.rotation).sin_cos();
        let rotated = Vec2::new(
            relative.x * cos - relative.y * sin,
            relative.x * sin + relative.y * cos,
        );
        rotated.scale(self.scale).add(self.viewport.center())
    }

    pub fn world_to_screen_px(&self, world: Vec2) -> (i32, i32) {
        let screen = self.world_to_screen(world);
        (screen.x.round() as i32, screen.y.round() as i32)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let scaled = screen.sub(self.viewport.center()).scale(self.scale.recip());
        let (sin, cos) = self.rotation.sin_cos();
        let unrotated = Vec2::new(
            scaled.x * cos - scaled.y * sin,
            scaled.x * sin + scaled.y * cos,
        );
        unrotated.add(self.position)
    }
}
