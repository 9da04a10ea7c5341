use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::content::{ContentError, ContentHandle, ContentSource};
use crate::ecs::{System, UpdateContext};
use crate::events::{DataReloadRequested, DataReloaded, EventBus, ReloadKind};

static RELOAD_QUEUE_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_reload_queue_poison_once(operation: &'static str) {
    if RELOAD_QUEUE_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "reload queue lock poisoned; recovered inner value");
    }
}

const FILE_KINDS: [ReloadKind; 3] = [
    ReloadKind::RenderConfig,
    ReloadKind::ActorDatabase,
    ReloadKind::AiCatalog,
];

/// Owns the shared content and services reload requests between ticks.
#[derive(Debug)]
pub struct DataSystem {
    source: ContentSource,
    content: ContentHandle,
    requests: Arc<Mutex<Vec<ReloadKind>>>,
    subscribed: bool,
}

impl DataSystem {
    pub fn new(source: ContentSource, content: ContentHandle) -> Self {
        Self {
            source,
            content,
            requests: Arc::new(Mutex::new(Vec::new())),
            subscribed: false,
        }
    }

    pub fn content(&self) -> ContentHandle {
        self.content.clone()
    }

    /// Schedules a reload for the next update without going through the bus.
    pub fn request_reload(&self, kind: ReloadKind) {
        lock_requests(&self.requests, "request").push(kind);
    }

    fn reload(&self, kind: ReloadKind, events: &EventBus) {
        let result = match kind {
            ReloadKind::ActorDatabase => self
                .source
                .load_actors()
                .map(|actors| self.content.replace_actors(actors)),
            ReloadKind::AiCatalog => self
                .source
                .load_ai_catalog()
                .map(|catalog| self.content.replace_ai_catalog(catalog)),
            ReloadKind::RenderConfig => self
                .source
                .load_render_config()
                .map(|config| self.content.replace_render_config(config)),
            ReloadKind::All => {
                for kind in FILE_KINDS {
                    self.reload(kind, events);
                }
                return;
            }
        };
        let path = self.source.path_for(kind);
        match result {
            Ok(()) => {
                info!(kind = kind.as_str(), path = %path.display(), "content_reloaded");
                events.queue(DataReloaded { path, kind });
            }
            Err(error) => log_reload_failure(kind, &error),
        }
    }
}

impl System for DataSystem {
    fn name(&self) -> &'static str {
        "data"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if !self.subscribed {
            self.subscribed = true;
            let requests = Arc::clone(&self.requests);
            ctx.events.subscribe(move |event: &DataReloadRequested| {
                lock_requests(&requests, "subscribe").push(event.kind);
            });
        }

        let pending = std::mem::take(&mut *lock_requests(&self.requests, "drain"));
        let mut handled: Vec<ReloadKind> = Vec::with_capacity(FILE_KINDS.len());
        for kind in pending.into_iter().flat_map(file_kinds) {
            if handled.contains(&kind) {
                continue;
            }
            self.reload(kind, ctx.events);
            handled.push(kind);
        }
    }
}

/// Expands `All` into the individual files so each one reloads at most once per drain.
fn file_kinds(kind: ReloadKind) -> Vec<ReloadKind> {
    match kind {
        ReloadKind::All => FILE_KINDS.to_vec(),
        other => vec![other],
    }
}

fn log_reload_failure(kind: ReloadKind, error: &ContentError) {
    warn!(kind = kind.as_str(), error = %error, "content_reload_failed");
}

fn lock_requests<'a>(
    requests: &'a Mutex<Vec<ReloadKind>>,
    operation: &'static str,
) -> MutexGuard<'a, Vec<ReloadKind>> {
    match requests.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_reload_queue_poison_once(operation);
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::content::{EmbeddedContent, ACTORS_FILE, AI_CATALOG_FILE};
    use crate::ecs::{SystemDescriptor, World};

    fn setup(dir: &std::path::Path) -> (World, ContentHandle, Arc<StdMutex<Vec<DataReloaded>>>) {
        let source = ContentSource::new(dir, EmbeddedContent::EMPTY);
        let content = ContentHandle::new(source.load_all().expect("initial content"));
        let mut world = World::new();
        world.add_system(
            Box::new(DataSystem::new(source, content.clone())),
            SystemDescriptor::new(),
        );
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        world.events().subscribe(move |event: &DataReloaded| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(event.clone());
            }
        });
        (world, content, seen)
    }

    #[test]
    fn requested_reload_swaps_content_and_announces_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(ACTORS_FILE),
            r#"{"actors": [{"name": "scout"}]}"#,
        )
        .expect("write actors");
        let (mut world, content, seen) = setup(dir.path());
        assert!(content.actors().template("scout").is_some());

        fs::write(
            dir.path().join(ACTORS_FILE),
            r#"{"actors": [{"name": "raider"}]}"#,
        )
        .expect("rewrite actors");
        world.events().queue(DataReloadRequested {
            kind: ReloadKind::ActorDatabase,
        });
        // Request lands at the first flush, the reload runs on the next tick
        // and its announcement lands at that tick's flush.
        world.update();
        world.update();

        assert!(content.actors().template("raider").is_some());
        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, ReloadKind::ActorDatabase);
        assert_eq!(seen[0].path, dir.path().join(ACTORS_FILE));
    }

    #[test]
    fn malformed_reload_keeps_previous_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(AI_CATALOG_FILE),
            r#"{"actions": [{"name": "chase", "type": "pursue"}]}"#,
        )
        .expect("write catalog");
        let (mut world, content, seen) = setup(dir.path());

        fs::write(dir.path().join(AI_CATALOG_FILE), "{ not json").expect("corrupt catalog");
        world.events().queue(DataReloadRequested {
            kind: ReloadKind::AiCatalog,
        });
        world.update();
        world.update();

        assert_eq!(content.ai_catalog().actions.len(), 1);
        assert!(seen.lock().map(|s| s.is_empty()).unwrap_or(false));
    }

    #[test]
    fn reload_all_announces_every_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut world, _content, seen) = setup(dir.path());

        for kind in [ReloadKind::All, ReloadKind::AiCatalog, ReloadKind::All] {
            world.events().queue(DataReloadRequested { kind });
        }
        world.update();
        world.update();

        let kinds: Vec<ReloadKind> = seen
            .lock()
            .map(|s| s.iter().map(|event| event.kind).collect())
            .unwrap_or_default();
        assert_eq!(
            kinds,
            vec![
                ReloadKind::RenderConfig,
                ReloadKind::ActorDatabase,
                ReloadKind::AiCatalog,
            ]
        );
    }

    #[test]
    fn single_file_before_all_is_not_reloaded_twice() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut world, _content, seen) = setup(dir.path());

        for kind in [ReloadKind::AiCatalog, ReloadKind::All] {
            world.events().queue(DataReloadRequested { kind });
        }
        world.update();
        world.update();

        let kinds: Vec<ReloadKind> = seen
            .lock()
            .map(|s| s.iter().map(|event| event.kind).collect())
            .unwrap_or_default();
        assert_eq!(
            kinds,
            vec![
                ReloadKind::AiCatalog,
                ReloadKind::RenderConfig,
                ReloadKind::ActorDatabase,
            ]
        );
    }
}
