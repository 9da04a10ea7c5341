use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::ecs::World;
use crate::render::{FrameSurface, Rgba, Surface};

pub const CLEAR_COLOR: Rgba = [8, 10, 18, 255];

/// Owns the pixel buffer behind the window and draws a world into it.
pub(crate) struct FramePresenter {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl FramePresenter {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Clears, draws the world group then the overlay group, and presents.
    pub(crate) fn present(&mut self, world: &mut World) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        {
            let mut surface = FrameSurface::new(self.pixels.frame_mut(), self.width, self.height);
            draw_frame(world, &mut surface);
        }
        self.pixels.render()
    }
}

pub(crate) fn draw_frame(world: &mut World, surface: &mut dyn Surface) {
    surface.clear(CLEAR_COLOR);
    world.draw_world(surface);
    world.draw_overlay(surface);
}
