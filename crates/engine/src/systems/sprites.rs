use std::path::Path;

use crate::ecs::{Camera, DrawContext, Position, Sprite, System, UpdateContext};
use crate::render::{CameraView, Rgba, SpriteCache, Surface, Viewport, PLACEHOLDER_HALF_SIZE_PX};

const PLACEHOLDER_COLOR: Rgba = [220, 220, 240, 255];

/// Draws every `Position` + `Sprite` entity through the first camera.
#[derive(Debug)]
pub struct SpriteRenderSystem {
    cache: SpriteCache,
    drawn_last_frame: usize,
}

impl SpriteRenderSystem {
    pub fn new(assets_dir: &Path) -> Self {
        Self {
            cache: SpriteCache::new(assets_dir),
            drawn_last_frame: 0,
        }
    }

    pub fn drawn_last_frame(&self) -> usize {
        self.drawn_last_frame
    }

    /// Forgets decoded images, e.g. after assets changed on disk.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl System for SpriteRenderSystem {
    fn name(&self) -> &'static str {
        "sprites"
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn draw(&mut self, ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        let (width, height) = surface.size();
        let viewport = Viewport::new(width, height);
        let view = ctx
            .entities
            .first_component::<Camera>()
            .map(|(_, camera)| CameraView::new(camera, viewport))
            .unwrap_or_else(|| CameraView::fallback(viewport));

        let mut drawn = 0;
        for entity in ctx.entities.entities() {
            let (Some(position), Some(sprite)) = (entity.get::<Position>(), entity.get::<Sprite>())
            else {
                continue;
            };
            let (x, y) = view.world_to_screen_px(position.as_vec2());
            match self.cache.get(&sprite.image) {
                Some(image) => {
                    let scale = view.scale * sprite_scale(sprite, image.width);
                    surface.blit_scaled(x, y, image, scale);
                }
                None => surface.fill_square(x, y, PLACEHOLDER_HALF_SIZE_PX, PLACEHOLDER_COLOR),
            }
            drawn += 1;
        }
        self.drawn_last_frame = drawn;
    }
}

/// Ratio of the requested on-screen width to the image's native width.
fn sprite_scale(sprite: &Sprite, image_width: u32) -> f32 {
    if sprite.width == 0 || image_width == 0 {
        1.0
    } else {
        sprite.width as f32 / image_width as f32
    }
}
