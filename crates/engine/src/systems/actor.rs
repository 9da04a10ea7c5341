use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::ecs::{Actor, ComponentKind, EntityId, PlayerInput, System, UpdateContext};

static REGISTRY_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_registry_lock_poison_once(operation: &'static str) {
    if REGISTRY_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "actor registry lock poisoned; recovered inner value");
    }
}

/// Frame-local index over `Actor` components. Rebuilt from scratch every update.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    by_id: HashMap<String, EntityId>,
    by_archetype: HashMap<String, Vec<EntityId>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every index but keeps the allocations.
    pub fn reset(&mut self) {
        self.by_id.clear();
        for bucket in self.by_archetype.values_mut() {
            bucket.clear();
        }
    }

    pub fn add(&mut self, actor: &Actor, entity: EntityId) {
        if actor.id.is_empty() {
            debug!(entity = entity.0, "actor_without_id_not_indexed");
            return;
        }
        self.by_id.insert(actor.id.clone(), entity);
        if !actor.archetype.is_empty() {
            self.by_archetype
                .entry(actor.archetype.clone())
                .or_default()
                .push(entity);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<EntityId> {
        self.by_id.get(id).copied()
    }

    /// Entities of `archetype`, sorted by entity id.
    pub fn find_by_archetype(&self, archetype: &str) -> Vec<EntityId> {
        let mut matches = self
            .by_archetype
            .get(archetype)
            .cloned()
            .unwrap_or_default();
        matches.sort();
        matches
    }

    /// Entities whose actor id starts with `prefix`, sorted by entity id.
    pub fn find_by_template_prefix(&self, prefix: &str) -> Vec<EntityId> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let mut matches: Vec<EntityId> = self
            .by_id
            .iter()
            .filter(|(id, _)| id.starts_with(prefix))
            .map(|(_, entity)| *entity)
            .collect();
        matches.sort();
        matches
    }

    /// Number of distinct actor ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Shared read access to the registry for systems that run after the rebuild.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistryHandle {
    registry: Arc<RwLock<ActorRegistry>>,
}

impl ActorRegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ActorRegistry> {
        match self.registry.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_registry_lock_poison_once("read");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ActorRegistry> {
        match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_registry_lock_poison_once("write");
                poisoned.into_inner()
            }
        }
    }
}

/// Rebuilds the registry and arbitrates primary input each update.
#[derive(Debug, Default)]
pub struct ActorSystem {
    registry: ActorRegistryHandle,
}

impl ActorSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> ActorRegistryHandle {
        self.registry.clone()
    }
}

impl System for ActorSystem {
    fn name(&self) -> &'static str {
        "actor"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let mut registry = self.registry.write();
        registry.reset();
        let mut primary: Option<EntityId> = None;

        for entity in ctx.entities.entities_mut() {
            let id = entity.id();
            if let Some(actor) = entity.get::<Actor>() {
                registry.add(actor, id);
            }

            let has_ai = entity.has(ComponentKind::AiController);
            let Some(input) = entity.get_mut::<PlayerInput>() else {
                continue;
            };
            if has_ai {
                input.enabled = false;
            } else if input.enabled && primary.is_none() {
                primary = Some(id);
            } else {
                input.enabled = false;
            }
        }
    }
}
