use super::surface::{Rgba, SpriteImage, Surface};

/// [`Surface`] over a borrowed RGBA8 frame buffer such as the `pixels` frame.
pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameSurface<'a> {
    /// Dimensions that do not match the buffer length are shrunk to an empty surface.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let required = width as usize * height as usize * 4;
        let (width, height) = if frame.len() >= required {
            (width, height)
        } else {
            (0, 0)
        };
        Self {
            frame,
            width,
            height,
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel = (y as usize).checked_mul(self.width as usize)?.checked_add(x as usize)?;
        let byte = pixel.checked_mul(4)?;
        (byte + 4 <= self.frame.len()).then_some(byte)
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            self.frame[offset..offset + 4].copy_from_slice(&color);
        }
    }

    fn fill_rect(&mut self, left: i32, top: i32, width: u32, height: u32, color: Rgba) {
        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = left.saturating_add(width as i32).min(self.width as i32);
        let draw_bottom = top.saturating_add(height as i32).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }
        let row_bytes = self.width as usize * 4;
        for y in draw_top..draw_bottom {
            let row = y as usize * row_bytes;
            let start = row + draw_left as usize * 4;
            let end = row + draw_right as usize * 4;
            for pixel in self.frame[start..end].chunks_exact_mut(4) {
                pixel.copy_from_slice(&color);
            }
        }
    }

    fn blit_scaled(&mut self, center_x: i32, center_y: i32, image: &SpriteImage, scale: f32) {
        if !image.is_well_formed() || self.width == 0 || self.height == 0 {
            return;
        }
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        let inv_scale = scale.recip();
        let scaled_w = (image.width as f32 * scale).round().max(1.0) as i32;
        let scaled_h = (image.height as f32 * scale).round().max(1.0) as i32;
        let left = center_x - scaled_w / 2;
        let top = center_y - scaled_h / 2;

        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = (left + scaled_w).min(self.width as i32);
        let draw_bottom = (top + scaled_h).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let frame_width = self.width as usize;
        let image_width = image.width as usize;
        for out_y in draw_top..draw_bottom {
            let src_y = (((out_y - top) as f32) * inv_scale).floor() as u32;
            let src_y = src_y.min(image.height - 1) as usize;
            let src_row = src_y * image_width * 4;
            let dst_row = out_y as usize * frame_width * 4;
            for out_x in draw_left..draw_right {
                let src_x = (((out_x - left) as f32) * inv_scale).floor() as u32;
                let src_x = src_x.min(image.width - 1) as usize;
                let src = src_row + src_x * 4;
                let alpha = image.rgba[src + 3];
                if alpha == 0 {
                    continue;
                }
                let dst = dst_row + out_x as usize * 4;
                self.frame[dst..dst + 3].copy_from_slice(&image.rgba[src..src + 3]);
                self.frame[dst + 3] = alpha;
            }
        }
    }
}
