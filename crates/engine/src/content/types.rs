use serde::{Deserialize, Serialize};

use crate::ecs::{
    AiController, FollowBehavior, PathBehavior, PursueBehavior, RetreatBehavior, Sprite,
    Velocity,
};

/// `actors.json`: every spawnable actor template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorDatabase {
    pub actors: Vec<ActorTemplate>,
}

impl ActorDatabase {
    pub fn template(&self, name: &str) -> Option<&ActorTemplate> {
        self.actors.iter().find(|template| template.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTemplate {
    pub name: String,
    pub archetype: String,
    pub persistent: bool,
    pub sprite: SpriteTemplate,
    pub velocity: Option<VelocityPreset>,
    /// Names of catalog actions composed into a controller at runtime.
    pub behaviors: Vec<String>,
    pub ai: Option<AiTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteTemplate {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub rotation: f32,
    pub flip_horizontal: bool,
}

impl SpriteTemplate {
    pub fn to_sprite(&self) -> Sprite {
        Sprite {
            image: self.image.clone(),
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityPreset {
    pub vx: f32,
    pub vy: f32,
}

impl VelocityPreset {
    pub fn to_velocity(self) -> Velocity {
        Velocity::new(self.vx, self.vy)
    }
}

/// Inline behavior block of an actor template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTemplate {
    pub speed: f32,
    pub follow: Option<FollowBehavior>,
    pub pursue: Option<PursueBehavior>,
    pub retreat: Option<RetreatBehavior>,
    pub patrol: Option<PathBehavior>,
    pub travel: Option<PathBehavior>,
}

impl AiTemplate {
    pub fn to_controller(&self) -> AiController {
        let mut controller = AiController::with_speed(self.speed);
        if let Some(follow) = &self.follow {
            controller.set_follow(follow.clone());
        }
        if let Some(pursue) = &self.pursue {
            controller.set_pursue(pursue.clone());
        }
        if let Some(retreat) = &self.retreat {
            controller.set_retreat(retreat.clone());
        }
        if let Some(patrol) = &self.patrol {
            controller.set_patrol(patrol.clone());
        }
        if let Some(travel) = &self.travel {
            controller.set_travel(travel.clone());
        }
        controller
    }
}

/// `ai.json`: reusable named actions referenced from `ActorTemplate::behaviors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiCatalog {
    pub actions: Vec<AiActionTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiActionTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: i32,
    pub params: serde_json::Value,
}

/// `render_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub target_tps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "simcore".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

pub const DEFAULT_CAMERA_MIN_SCALE: f32 = 0.5;
pub const DEFAULT_CAMERA_MAX_SCALE: f32 = 3.0;
pub const DEFAULT_CAMERA_ZOOM_STEP: f32 = 0.1;
pub const DEFAULT_CAMERA_FOLLOW_LERP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
    /// Zero snaps straight to the target scale.
    pub zoom_lerp: f32,
    pub follow_lerp: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_CAMERA_MIN_SCALE,
            max_scale: DEFAULT_CAMERA_MAX_SCALE,
            zoom_step: DEFAULT_CAMERA_ZOOM_STEP,
            zoom_lerp: 0.2,
            follow_lerp: DEFAULT_CAMERA_FOLLOW_LERP,
        }
    }
}

impl CameraConfig {
    /// Replaces non-positive limits with defaults and keeps `max >= min`.
    pub fn normalized(mut self) -> Self {
        if self.min_scale <= 0.0 {
            self.min_scale = DEFAULT_CAMERA_MIN_SCALE;
        }
        if self.max_scale <= 0.0 {
            self.max_scale = DEFAULT_CAMERA_MAX_SCALE;
        }
        if self.max_scale < self.min_scale {
            self.max_scale = self.min_scale;
        }
        if self.zoom_step <= 0.0 {
            self.zoom_step = DEFAULT_CAMERA_ZOOM_STEP;
        }
        if self.zoom_lerp < 0.0 {
            self.zoom_lerp = 0.0;
        }
        if self.follow_lerp <= 0.0 || self.follow_lerp > 1.0 {
            self.follow_lerp = DEFAULT_CAMERA_FOLLOW_LERP;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{PathState, PathVariant};

    #[test]
    fn camera_config_normalizes_bad_limits() {
        let config = CameraConfig {
            min_scale: -1.0,
            max_scale: 0.2,
            zoom_step: 0.0,
            zoom_lerp: -3.0,
            follow_lerp: 4.0,
        }
        .normalized();

        assert_eq!(config.min_scale, DEFAULT_CAMERA_MIN_SCALE);
        assert_eq!(config.max_scale, DEFAULT_CAMERA_MIN_SCALE);
        assert_eq!(config.zoom_step, DEFAULT_CAMERA_ZOOM_STEP);
        assert_eq!(config.zoom_lerp, 0.0);
        assert_eq!(config.follow_lerp, DEFAULT_CAMERA_FOLLOW_LERP);
    }

    #[test]
    fn actor_template_parses_inline_ai_block() {
        let template: ActorTemplate = serde_json::from_value(serde_json::json!({
            "name": "drone",
            "archetype": "enemy",
            "sprite": {"image": "ships/drone", "width": 16, "height": 16},
            "ai": {
                "speed": 1.5,
                "patrol": {"variant": "pingpong", "waypoints": [{"x": 0, "y": 0}, {"x": 10, "y": 0}]},
                "retreat": {"target": "player", "trigger_distance": 80}
            }
        }))
        .expect("template");

        assert!(!template.persistent);
        assert!(template.velocity.is_none());
        let controller = template.ai.as_ref().expect("ai").to_controller();
        assert_eq!(controller.speed, 1.5);
        assert_eq!(
            controller.patrol.as_ref().map(|patrol| patrol.variant),
            Some(PathVariant::PingPong)
        );
        assert_eq!(controller.patrol_state, PathState::default());
        assert_eq!(
            controller.retreat.as_ref().map(|retreat| retreat.trigger_distance),
            Some(80.0)
        );
        assert!(controller.follow.is_none());
    }

    #[test]
    fn render_config_fills_missing_sections() {
        let config: RenderConfig =
            serde_json::from_value(serde_json::json!({"window": {"width": 640}})).expect("config");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera, CameraConfig::default());
    }
}
