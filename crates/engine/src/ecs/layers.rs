use std::fmt;

/// Layers at or above this value are composited after the world pass.
pub const OVERLAY_THRESHOLD: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawLayer(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerGroup {
    World,
    Overlay,
}

impl DrawLayer {
    pub const BACKGROUND: DrawLayer = DrawLayer(0);
    pub const WORLD: DrawLayer = DrawLayer(100);
    pub const FOREGROUND: DrawLayer = DrawLayer(200);
    pub const HUD: DrawLayer = DrawLayer(OVERLAY_THRESHOLD);
    pub const ENTITY_LIST: DrawLayer = DrawLayer(1100);
    pub const DEBUG: DrawLayer = DrawLayer(1200);
    pub const CONSOLE: DrawLayer = DrawLayer(1300);

    pub const WORLD_GROUP: [DrawLayer; 3] = [Self::BACKGROUND, Self::WORLD, Self::FOREGROUND];
    pub const OVERLAY_GROUP: [DrawLayer; 4] =
        [Self::HUD, Self::ENTITY_LIST, Self::DEBUG, Self::CONSOLE];

    pub fn group(self) -> LayerGroup {
        if self.0 >= OVERLAY_THRESHOLD {
            LayerGroup::Overlay
        } else {
            LayerGroup::World
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::BACKGROUND => Some("background"),
            Self::WORLD => Some("world"),
            Self::FOREGROUND => Some("foreground"),
            Self::HUD => Some("hud"),
            Self::ENTITY_LIST => Some("entity_list"),
            Self::DEBUG => Some("debug"),
            Self::CONSOLE => Some("console"),
            _ => None,
        }
    }
}

impl fmt::Display for DrawLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "custom({})", self.0),
        }
    }
}
