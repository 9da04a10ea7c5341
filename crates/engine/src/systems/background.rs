use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ecs::{Camera, DrawContext, System, UpdateContext};
use crate::render::Surface;

pub const STARFIELD_PARALLAX: f32 = 0.05;
/// One star per this many screen pixels.
const STAR_DENSITY_PX: u32 = 2000;
const STAR_MIN_BRIGHTNESS: u8 = 155;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    x: f32,
    y: f32,
    brightness: u8,
}

/// Parallax starfield for the background layer. Stars are generated on the
/// first draw and regenerated when the surface size changes.
#[derive(Debug)]
pub struct StarfieldSystem {
    rng: StdRng,
    stars: Vec<Star>,
    generated_for: (u32, u32),
}

impl StarfieldSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            stars: Vec::new(),
            generated_for: (0, 0),
        }
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    fn ensure_stars(&mut self, size: (u32, u32)) {
        if self.generated_for == size {
            return;
        }
        let (width, height) = size;
        let count = (width as u64 * height as u64 / STAR_DENSITY_PX as u64) as usize;
        let rng = &mut self.rng;
        self.stars = (0..count)
            .map(|_| Star {
                x: rng.random_range(0.0..width as f32),
                y: rng.random_range(0.0..height as f32),
                brightness: rng.random_range(STAR_MIN_BRIGHTNESS..=u8::MAX),
            })
            .collect();
        self.generated_for = size;
    }
}

impl System for StarfieldSystem {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn draw(&mut self, ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        let size = surface.size();
        if size.0 == 0 || size.1 == 0 {
            return;
        }
        self.ensure_stars(size);

        let offset = ctx
            .entities
            .first_component::<Camera>()
            .map(|(_, camera)| camera.position.scale(STARFIELD_PARALLAX))
            .unwrap_or_default();
        let (width, height) = (size.0 as f32, size.1 as f32);
        for star in &self.stars {
            let x = wrap(star.x - offset.x, width);
            let y = wrap(star.y - offset.y, height);
            let b = star.brightness;
            surface.put_pixel(x as i32, y as i32, [b, b, b, 255]);
        }
    }
}

fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
