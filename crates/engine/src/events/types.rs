use std::path::PathBuf;

use crate::ecs::{EntityId, Position};
use crate::systems::SceneFactory;

/// Queued by the movement system for every entity that moved this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMovedEvent {
    pub entity: EntityId,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpawnedEvent {
    pub entity: EntityId,
    pub actor_id: String,
}

/// Requests an absolute camera zoom; the camera clamps it to its limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraZoomEvent {
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugToggleEvent {
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SceneChangeEvent {
    pub target: String,
    pub scene: SceneFactory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadKind {
    RenderConfig,
    ActorDatabase,
    AiCatalog,
    All,
}

impl ReloadKind {
    /// True when a reload of `self` affects data tagged `other`.
    pub fn covers(self, other: ReloadKind) -> bool {
        self == ReloadKind::All || other == ReloadKind::All || self == other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RenderConfig => "render_config",
            Self::ActorDatabase => "actor_database",
            Self::AiCatalog => "ai_catalog",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataReloadRequested {
    pub kind: ReloadKind,
}

/// Queued after a data file was re-read and swapped into the shared content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataReloaded {
    pub path: PathBuf,
    pub kind: ReloadKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_all_covers_every_kind() {
        assert!(ReloadKind::All.covers(ReloadKind::AiCatalog));
        assert!(ReloadKind::ActorDatabase.covers(ReloadKind::All));
        assert!(ReloadKind::AiCatalog.covers(ReloadKind::AiCatalog));
        assert!(!ReloadKind::RenderConfig.covers(ReloadKind::ActorDatabase));
    }
}
