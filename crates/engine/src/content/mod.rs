mod loader;
mod spawner;
mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub use loader::{
    parse_document, ContentError, ContentSource, EmbeddedContent, ACTORS_FILE, AI_CATALOG_FILE,
    RENDER_CONFIG_FILE,
};
pub use spawner::{ActorSpawner, SpawnError};
pub use types::{
    ActorDatabase, ActorTemplate, AiActionTemplate, AiCatalog, AiTemplate, CameraConfig,
    RenderConfig, SpriteTemplate, VelocityPreset, WindowConfig,
};

static CONTENT_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_content_lock_poison_once(operation: &'static str) {
    if CONTENT_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "content lock poisoned; recovered inner value");
    }
}

/// Parsed data files. Each document is shared so snapshots stay cheap.
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    pub actors: Arc<ActorDatabase>,
    pub ai_catalog: Arc<AiCatalog>,
    pub render_config: Arc<RenderConfig>,
}

impl ContentSet {
    pub fn new(actors: ActorDatabase, ai_catalog: AiCatalog, render_config: RenderConfig) -> Self {
        Self {
            actors: Arc::new(actors),
            ai_catalog: Arc::new(ai_catalog),
            render_config: Arc::new(render_config),
        }
    }
}

/// Shared, swappable view of the current [`ContentSet`].
#[derive(Debug, Clone, Default)]
pub struct ContentHandle {
    content: Arc<RwLock<ContentSet>>,
}

impl ContentHandle {
    pub fn new(content: ContentSet) -> Self {
        Self {
            content: Arc::new(RwLock::new(content)),
        }
    }

    pub fn snapshot(&self) -> ContentSet {
        self.read("snapshot").clone()
    }

    pub fn actors(&self) -> Arc<ActorDatabase> {
        Arc::clone(&self.read("actors").actors)
    }

    pub fn ai_catalog(&self) -> Arc<AiCatalog> {
        Arc::clone(&self.read("ai_catalog").ai_catalog)
    }

    pub fn render_config(&self) -> Arc<RenderConfig> {
        Arc::clone(&self.read("render_config").render_config)
    }

    pub fn replace_actors(&self, actors: ActorDatabase) {
        self.write("replace_actors").actors = Arc::new(actors);
    }

    pub fn replace_ai_catalog(&self, ai_catalog: AiCatalog) {
        self.write("replace_ai_catalog").ai_catalog = Arc::new(ai_catalog);
    }

    pub fn replace_render_config(&self, render_config: RenderConfig) {
        self.write("replace_render_config").render_config = Arc::new(render_config);
    }

    fn read(&self, operation: &'static str) -> RwLockReadGuard<'_, ContentSet> {
        match self.content.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_content_lock_poison_once(operation);
                poisoned.into_inner()
            }
        }
    }

    fn write(&self, operation: &'static str) -> RwLockWriteGuard<'_, ContentSet> {
        match self.content.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_content_lock_poison_once(operation);
                poisoned.into_inner()
            }
        }
    }
}
