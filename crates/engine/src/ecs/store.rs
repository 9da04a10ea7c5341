use tracing::debug;

use super::components::{ComponentData, ComponentKind};
use super::entity::{Entity, EntityId, EntityIdAllocator};

/// Live entities in insertion order.
#[derive(Debug, Default)]
pub struct EntityStore {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id and appends an empty entity.
    pub fn new_entity(&mut self) -> &mut Entity {
        let id = self.allocator.allocate();
        let index = self.entities.len();
        self.entities.push(Entity::new(id));
        &mut self.entities[index]
    }

    /// Removes the entity in place. Unknown ids are ignored.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        match self.entities.iter().position(|entity| entity.id() == id) {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => {
                debug!(entity = id.0, "remove_entity_ignored_unknown_id");
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    pub fn for_each(&self, mut visit: impl FnMut(&Entity)) {
        for entity in &self.entities {
            visit(entity);
        }
    }

    pub fn for_each_mut(&mut self, mut visit: impl FnMut(&mut Entity)) {
        for entity in &mut self.entities {
            visit(entity);
        }
    }

    pub fn find_by_component(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|entity| entity.has(kind))
            .map(Entity::id)
            .collect()
    }

    pub fn first_component<T: ComponentData>(&self) -> Option<(EntityId, &T)> {
        self.entities
            .iter()
            .find_map(|entity| entity.get::<T>().map(|value| (entity.id(), value)))
    }

    pub fn first_component_mut<T: ComponentData>(&mut self) -> Option<(EntityId, &mut T)> {
        self.entities.iter_mut().find_map(|entity| {
            let id = entity.id();
            entity.get_mut::<T>().map(|value| (id, value))
        })
    }
}
