use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::components::{Component, ComponentData, ComponentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// An identifier plus at most one component per kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    components: BTreeMap<ComponentKind, Component>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Adds `value`, replacing any component of the same kind.
    pub fn insert<T: ComponentData>(&mut self, value: T) -> &mut Self {
        self.insert_component(value.into_component());
        self
    }

    pub fn insert_component(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        let previous = self.components.insert(kind, component);
        if previous.is_some() {
            debug!(entity = self.id.0, kind = kind.name(), "component_overwritten");
        }
        previous
    }

    pub fn with<T: ComponentData>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        self.components.get(&T::KIND).and_then(T::from_component)
    }

    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Writes `value` without the overwrite diagnostic; for per-frame state.
    pub fn set<T: ComponentData>(&mut self, value: T) {
        match self.get_mut::<T>() {
            Some(slot) => *slot = value,
            None => {
                self.components.insert(T::KIND, value.into_component());
            }
        }
    }

    pub fn remove<T: ComponentData>(&mut self) -> Option<T> {
        self.components.remove(&T::KIND).and_then(T::from_owned)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}
