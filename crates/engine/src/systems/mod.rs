//! Built-in systems. Register them on a [`crate::ecs::World`] with a
//! [`crate::ecs::SystemDescriptor`]; see [`priorities`] for the usual order.

pub mod actor;
pub mod ai;
mod background;
mod camera;
mod data;
mod debug_overlay;
mod input;
mod movement;
mod scene;
mod sprites;

pub use actor::{ActorRegistry, ActorRegistryHandle, ActorSystem};
pub use ai::{AiSystem, BehaviorCatalog};
pub use background::{StarfieldSystem, STARFIELD_PARALLAX};
pub use camera::{normalize_rotation, CameraSystem, CAMERA_ROTATION_STEP};
pub use data::DataSystem;
pub use debug_overlay::DebugOverlaySystem;
pub use input::{InputSystem, DEFAULT_PLAYER_SPEED};
pub use movement::MovementSystem;
pub use scene::{Scene, SceneFactory, SceneManager};
pub use sprites::SpriteRenderSystem;

/// Update priorities for the built-in systems. Lower runs first.
pub mod priorities {
    pub const DATA: i32 = -200;
    pub const SCENE: i32 = -100;
    pub const ACTOR: i32 = 0;
    pub const INPUT: i32 = 10;
    pub const AI: i32 = 20;
    pub const MOVEMENT: i32 = 30;
    pub const CAMERA: i32 = 40;
}
