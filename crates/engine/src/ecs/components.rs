use serde::{Deserialize, Serialize};

use super::ai::AiController;
use super::entity::EntityId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn from_vec2(value: Vec2) -> Self {
        Self {
            vx: value.x,
            vy: value.y,
        }
    }

    pub fn is_zero(self) -> bool {
        self.vx == 0.0 && self.vy == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sprite {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub rotation: f32,
    pub flip_horizontal: bool,
}

/// Logical identity of a spawned actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub archetype: String,
    pub persistent: bool,
    /// Named entries of the behavior catalog composed into an `AiController`.
    pub behaviors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerInput {
    pub enabled: bool,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraTarget;

pub const CAMERA_SCALE_DEFAULT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub scale: f32,
    pub target_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub default_scale: f32,
    pub rotation: f32,
    pub target: Option<EntityId>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: CAMERA_SCALE_DEFAULT,
            target_scale: 0.0,
            min_scale: 0.0,
            max_scale: 0.0,
            default_scale: 0.0,
            rotation: 0.0,
            target: None,
        }
    }
}

impl Camera {
    pub fn at(position: Vec2, scale: f32) -> Self {
        Self {
            position,
            scale,
            ..Self::default()
        }
    }

    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            CAMERA_SCALE_DEFAULT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Position,
    Velocity,
    Sprite,
    Actor,
    AiController,
    PlayerInput,
    CameraTarget,
    Camera,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Position,
        ComponentKind::Velocity,
        ComponentKind::Sprite,
        ComponentKind::Actor,
        ComponentKind::AiController,
        ComponentKind::PlayerInput,
        ComponentKind::CameraTarget,
        ComponentKind::Camera,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Velocity => "Velocity",
            Self::Sprite => "Sprite",
            Self::Actor => "Actor",
            Self::AiController => "AIController",
            Self::PlayerInput => "PlayerInput",
            Self::CameraTarget => "CameraTarget",
            Self::Camera => "Camera",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Position(Position),
    Velocity(Velocity),
    Sprite(Sprite),
    Actor(Actor),
    AiController(AiController),
    PlayerInput(PlayerInput),
    CameraTarget(CameraTarget),
    Camera(Camera),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Velocity(_) => ComponentKind::Velocity,
            Self::Sprite(_) => ComponentKind::Sprite,
            Self::Actor(_) => ComponentKind::Actor,
            Self::AiController(_) => ComponentKind::AiController,
            Self::PlayerInput(_) => ComponentKind::PlayerInput,
            Self::CameraTarget(_) => ComponentKind::CameraTarget,
            Self::Camera(_) => ComponentKind::Camera,
        }
    }
}

/// Typed view over one variant of [`Component`].
pub trait ComponentData: Sized + 'static {
    const KIND: ComponentKind;

    fn into_component(self) -> Component;
    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
    fn from_owned(component: Component) -> Option<Self>;
}

macro_rules! component_data {
    ($ty:ident) => {
        impl ComponentData for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn into_component(self) -> Component {
                Component::$ty(self)
            }

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$ty(value) => Some(value),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$ty(value) => Some(value),
                    _ => None,
                }
            }

            fn from_owned(component: Component) -> Option<Self> {
                match component {
                    Component::$ty(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$ty(value)
            }
        }
    };
}

component_data!(Position);
component_data!(Velocity);
component_data!(Sprite);
component_data!(Actor);
component_data!(AiController);
component_data!(PlayerInput);
component_data!(CameraTarget);
component_data!(Camera);
