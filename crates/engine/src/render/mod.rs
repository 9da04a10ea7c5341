mod frame;
mod sprites;
mod surface;
mod transform;

pub use frame::FrameSurface;
pub use sprites::{validate_sprite_key, SpriteCache, SpriteKeyError};
pub use surface::{Rgba, SpriteImage, Surface};
pub use transform::{CameraView, Viewport};

/// Half extent of the square drawn in place of a missing sprite.
pub const PLACEHOLDER_HALF_SIZE_PX: i32 = 5;
