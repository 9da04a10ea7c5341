mod ai;
mod components;
mod entity;
mod layers;
mod store;
mod system;
mod world;

pub use ai::{
    AiController, FollowBehavior, PathBehavior, PathState, PathVariant, PursueBehavior,
    RetreatBehavior, DEFAULT_AI_SPEED,
};
pub use components::{
    Actor, Camera, CameraTarget, Component, ComponentData, ComponentKind, PlayerInput, Position,
    Sprite, Vec2, Velocity, CAMERA_SCALE_DEFAULT,
};
pub use entity::{Entity, EntityId, EntityIdAllocator};
pub use layers::{DrawLayer, LayerGroup, OVERLAY_THRESHOLD};
pub use store::EntityStore;
pub use system::{DrawContext, System, SystemDescriptor, UpdateContext};
pub use world::World;
