pub type Rgba = [u8; 4];

/// Decoded RGBA8 image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() >= self.width as usize * self.height as usize * 4
    }
}

/// Drawable target handed to draw passes. All primitives clip to the surface bounds.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgba);
    fn put_pixel(&mut self, x: i32, y: i32, color: Rgba);
    fn fill_rect(&mut self, left: i32, top: i32, width: u32, height: u32, color: Rgba);
    fn blit_scaled(&mut self, center_x: i32, center_y: i32, image: &SpriteImage, scale: f32);

    fn stroke_rect(&mut self, left: i32, top: i32, width: u32, height: u32, color: Rgba) {
        if width == 0 || height == 0 {
            return;
        }
        let right = left + width as i32 - 1;
        let bottom = top + height as i32 - 1;
        for x in left..=right {
            self.put_pixel(x, top, color);
            self.put_pixel(x, bottom, color);
        }
        for y in top..=bottom {
            self.put_pixel(left, y, color);
            self.put_pixel(right, y, color);
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.put_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    fn fill_square(&mut self, center_x: i32, center_y: i32, half_size: i32, color: Rgba) {
        let side = (half_size.max(0) * 2 + 1) as u32;
        self.fill_rect(center_x - half_size, center_y - half_size, side, side, color);
    }
}
