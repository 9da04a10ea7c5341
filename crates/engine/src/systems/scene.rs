use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::ecs::{DrawContext, System, UpdateContext};
use crate::events::SceneChangeEvent;
use crate::render::Surface;

static SCENE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_scene_lock_poison_once(operation: &'static str) {
    if SCENE_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "scene lock poisoned; recovered inner value");
    }
}

/// A unit of gameplay installed by the [`SceneManager`]. Scenes own the
/// entities they spawn and are expected to remove them in `unload`.
pub trait Scene: Send {
    fn name(&self) -> &str;

    fn init(&mut self, ctx: &mut UpdateContext<'_>);

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    fn draw(&mut self, _ctx: &DrawContext<'_>, _surface: &mut dyn Surface) {}

    fn unload(&mut self, _ctx: &mut UpdateContext<'_>) {}
}

/// Constructs a fresh scene on demand; carried by [`SceneChangeEvent`].
#[derive(Clone)]
pub struct SceneFactory {
    build: Arc<dyn Fn() -> Box<dyn Scene> + Send + Sync>,
}

impl SceneFactory {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Box<dyn Scene> + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
        }
    }

    pub fn build(&self) -> Box<dyn Scene> {
        (self.build)()
    }
}

impl fmt::Debug for SceneFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneFactory").finish_non_exhaustive()
    }
}

type PendingScene = Arc<Mutex<Option<Box<dyn Scene>>>>;

/// Swaps scenes on update boundaries. Requests only ever set the pending
/// slot; the swap happens at the start of the next update.
pub struct SceneManager {
    current: Option<Box<dyn Scene>>,
    pending: PendingScene,
    subscribed: bool,
}

impl SceneManager {
    pub fn new() -> Self {
        Self {
            current: None,
            pending: Arc::new(Mutex::new(None)),
            subscribed: false,
        }
    }

    /// Starts with `scene` pending so it is installed on the first update.
    pub fn with_initial(scene: Box<dyn Scene>) -> Self {
        let manager = Self::new();
        manager.queue_scene(scene);
        manager
    }

    /// Replaces any earlier request that has not been installed yet.
    pub fn queue_scene(&self, scene: Box<dyn Scene>) {
        queue_into(&self.pending, scene);
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref().map(|scene| scene.name())
    }

    pub fn has_pending(&self) -> bool {
        lock_pending(&self.pending, "has_pending").is_some()
    }

    fn subscribe(&mut self, ctx: &UpdateContext<'_>) {
        if self.subscribed {
            return;
        }
        self.subscribed = true;
        let pending = Arc::clone(&self.pending);
        ctx.events.subscribe(move |event: &SceneChangeEvent| {
            debug!(target_scene = %event.target, "scene_change_requested");
            queue_into(&pending, event.scene.build());
        });
    }

    fn install_pending(&mut self, ctx: &mut UpdateContext<'_>) {
        let Some(mut next) = lock_pending(&self.pending, "install").take() else {
            return;
        };
        let previous = self.current.take().map(|mut scene| {
            scene.unload(ctx);
            scene.name().to_string()
        });
        next.init(ctx);
        info!(
            scene = next.name(),
            previous = previous.as_deref().unwrap_or("none"),
            entity_count = ctx.entities.count(),
            "scene_activated"
        );
        self.current = Some(next);
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SceneManager {
    fn name(&self) -> &'static str {
        "scene_manager"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.subscribe(ctx);
        self.install_pending(ctx);
        if let Some(scene) = self.current.as_mut() {
            scene.update(ctx);
        }
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        if let Some(scene) = self.current.as_mut() {
            scene.draw(ctx, surface);
        }
    }
}

fn queue_into(pending: &PendingScene, scene: Box<dyn Scene>) {
    let mut slot = lock_pending(pending, "queue");
    if let Some(replaced) = slot.replace(scene) {
        debug!(scene = replaced.name(), "pending_scene_replaced");
    }
}

fn lock_pending<'a>(
    pending: &'a PendingScene,
    operation: &'static str,
) -> MutexGuard<'a, Option<Box<dyn Scene>>> {
    match pending.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_scene_lock_poison_once(operation);
            poisoned.into_inner()
        }
    }
}
