use crate::events::EventBus;
use crate::input::InputSnapshot;
use crate::render::Surface;

use super::layers::DrawLayer;
use super::store::EntityStore;

/// Borrowed world state handed to one system for one update call.
pub struct UpdateContext<'a> {
    pub entities: &'a mut EntityStore,
    pub events: &'a EventBus,
    pub input: &'a InputSnapshot,
    pub frame: u64,
}

/// Read-only world state for draw passes.
pub struct DrawContext<'a> {
    pub entities: &'a EntityStore,
    pub events: &'a EventBus,
    pub layer: DrawLayer,
}

pub trait System {
    fn name(&self) -> &'static str;

    fn update(&mut self, ctx: &mut UpdateContext<'_>);

    /// Only called for systems registered with a draw layer.
    fn draw(&mut self, _ctx: &DrawContext<'_>, _surface: &mut dyn Surface) {}
}

/// Registration-time scheduling options for a system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemDescriptor {
    pub priority: i32,
    pub layer: Option<DrawLayer>,
}

impl SystemDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_layer(mut self, layer: DrawLayer) -> Self {
        self.layer = Some(layer);
        self
    }
}
