use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::ActorTemplate;
use super::ContentHandle;
use crate::ecs::{Actor, EntityId, EntityStore, Position};
use crate::events::{DataReloaded, EntitySpawnedEvent, EventBus, ReloadKind};

static SPAWNER_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_spawner_lock_poison_once(operation: &'static str) {
    if SPAWNER_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "spawner lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("actor template '{0}' not found")]
    UnknownTemplate(String),
}

#[derive(Debug, Default)]
struct SpawnerState {
    /// Built from the content handle on first use after an invalidation.
    templates: Option<HashMap<String, ActorTemplate>>,
    counters: HashMap<String, u32>,
}

/// Spawns entities from actor templates. Clones share the template cache and id counters.
#[derive(Debug, Clone)]
pub struct ActorSpawner {
    content: ContentHandle,
    state: Arc<Mutex<SpawnerState>>,
    subscribed: Arc<AtomicBool>,
}

impl ActorSpawner {
    pub fn new(content: ContentHandle) -> Self {
        Self {
            content,
            state: Arc::new(Mutex::new(SpawnerState::default())),
            subscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Drops the template cache whenever actor data is reloaded. Safe to call repeatedly.
    pub fn subscribe_reloads(&self, events: &EventBus) {
        if self.subscribed.swap(true, Ordering::AcqRel) {
            return;
        }
        let spawner = self.clone();
        events.subscribe(move |event: &DataReloaded| {
            if event.kind.covers(ReloadKind::ActorDatabase) {
                spawner.invalidate();
            }
        });
    }

    pub fn invalidate(&self) {
        self.lock("invalidate").templates = None;
        debug!("actor_template_cache_invalidated");
    }

    pub fn spawn(
        &self,
        entities: &mut EntityStore,
        events: &EventBus,
        template: &str,
        position: Position,
    ) -> Result<EntityId, SpawnError> {
        let (template, actor_id) = {
            let mut state = self.lock("spawn");
            let found = self
                .templates(&mut state)
                .get(template)
                .cloned()
                .ok_or_else(|| SpawnError::UnknownTemplate(template.to_string()))?;
            let counter = state.counters.entry(found.name.clone()).or_insert(0);
            *counter = counter.saturating_add(1);
            let actor_id = format!("{}-{:03}", found.name, counter);
            (found, actor_id)
        };

        let entity = entities.new_entity();
        entity
            .insert(Actor {
                id: actor_id.clone(),
                archetype: template.archetype.clone(),
                persistent: template.persistent,
                behaviors: template.behaviors.clone(),
            })
            .insert(position);
        if let Some(velocity) = template.velocity {
            entity.insert(velocity.to_velocity());
        }
        if !template.sprite.image.is_empty() {
            entity.insert(template.sprite.to_sprite());
        }
        if let Some(ai) = &template.ai {
            entity.insert(ai.to_controller());
        }
        let id = entity.id();

        debug!(entity = id.0, actor = %actor_id, template = %template.name, "actor_spawned");
        events.queue(EntitySpawnedEvent {
            entity: id,
            actor_id,
        });
        Ok(id)
    }

    /// Like [`ActorSpawner::spawn`] but logs failures instead of returning them.
    pub fn try_spawn(
        &self,
        entities: &mut EntityStore,
        events: &EventBus,
        template: &str,
        position: Position,
    ) -> Option<EntityId> {
        match self.spawn(entities, events, template, position) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(template, error = %error, "actor_spawn_failed");
                None
            }
        }
    }

    fn templates<'a>(&self, state: &'a mut SpawnerState) -> &'a HashMap<String, ActorTemplate> {
        state.templates.get_or_insert_with(|| {
            let actors = self.content.actors();
            let templates: HashMap<String, ActorTemplate> = actors
                .actors
                .iter()
                .map(|template| (template.name.clone(), template.clone()))
                .collect();
            info!(template_count = templates.len(), "actor_template_cache_built");
            templates
        })
    }

    fn lock(&self, operation: &'static str) -> MutexGuard<'_, SpawnerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_spawner_lock_poison_once(operation);
                poisoned.into_inner()
            }
        }
    }
}
