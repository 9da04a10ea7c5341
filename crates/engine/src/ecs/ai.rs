use serde::{Deserialize, Serialize};

use super::components::Vec2;

pub const DEFAULT_AI_SPEED: f32 = 2.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowBehavior {
    pub target: String,
    pub offset_x: f32,
    pub offset_y: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursueBehavior {
    pub target: String,
    /// Zero disables the range check.
    pub engage_distance: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetreatBehavior {
    pub target: String,
    pub trigger_distance: f32,
    pub safe_distance: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PathVariant {
    #[default]
    Loop,
    PingPong,
    Once,
    Random,
}

impl PathVariant {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pingpong" => Self::PingPong,
            "once" => Self::Once,
            "random" => Self::Random,
            _ => Self::Loop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::PingPong => "pingpong",
            Self::Once => "once",
            Self::Random => "random",
        }
    }
}

impl From<String> for PathVariant {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PathVariant> for String {
    fn from(value: PathVariant) -> Self {
        value.as_str().to_string()
    }
}

/// Shared config for patrol and travel routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathBehavior {
    pub variant: PathVariant,
    pub waypoints: Vec<Vec2>,
    pub speed: f32,
}

/// Runtime progress through a [`PathBehavior`]; owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathState {
    pub index: usize,
    pub forward: bool,
    pub completed: bool,
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            index: 0,
            forward: true,
            completed: false,
        }
    }
}

impl PathState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiController {
    pub active: bool,
    pub speed: f32,
    pub follow: Option<FollowBehavior>,
    pub pursue: Option<PursueBehavior>,
    pub retreat: Option<RetreatBehavior>,
    pub patrol: Option<PathBehavior>,
    pub travel: Option<PathBehavior>,
    pub patrol_state: PathState,
    pub travel_state: PathState,
    /// Set while fleeing, cleared once the safe distance is reached.
    pub retreating: bool,
}

impl Default for AiController {
    fn default() -> Self {
        Self {
            active: true,
            speed: 0.0,
            follow: None,
            pursue: None,
            retreat: None,
            patrol: None,
            travel: None,
            patrol_state: PathState::default(),
            travel_state: PathState::default(),
            retreating: false,
        }
    }
}

impl AiController {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    pub fn set_follow(&mut self, behavior: FollowBehavior) {
        self.follow = Some(behavior);
    }

    pub fn set_pursue(&mut self, behavior: PursueBehavior) {
        self.pursue = Some(behavior);
    }

    pub fn set_retreat(&mut self, behavior: RetreatBehavior) {
        self.retreat = Some(behavior);
        self.retreating = false;
    }

    pub fn set_patrol(&mut self, behavior: PathBehavior) {
        self.patrol = Some(behavior);
        self.patrol_state.reset();
    }

    pub fn set_travel(&mut self, behavior: PathBehavior) {
        self.travel = Some(behavior);
        self.travel_state.reset();
    }

    pub fn has_behaviors(&self) -> bool {
        self.follow.is_some()
            || self.pursue.is_some()
            || self.retreat.is_some()
            || self.patrol.is_some()
            || self.travel.is_some()
    }
}
