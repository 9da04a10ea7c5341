use crate::ecs::{Actor, Entity, EntityId, EntityStore, Position, Vec2};
use crate::systems::actor::ActorRegistry;

const ARCHETYPE_PREFIX: &str = "archetype:";
const TEMPLATE_PREFIX: &str = "template:";

/// Parsed form of a behavior's `target` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef<'a> {
    ActorId(&'a str),
    Archetype(&'a str),
    TemplatePrefix(&'a str),
}

impl<'a> TargetRef<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if let Some(archetype) = raw.strip_prefix(ARCHETYPE_PREFIX) {
            return Some(Self::Archetype(archetype));
        }
        if let Some(prefix) = raw.strip_prefix(TEMPLATE_PREFIX) {
            return Some(Self::TemplatePrefix(prefix));
        }
        Some(Self::ActorId(raw))
    }

    fn matches(self, actor: &Actor) -> bool {
        match self {
            Self::ActorId(id) => actor.id == id,
            Self::Archetype(archetype) => !archetype.is_empty() && actor.archetype == archetype,
            Self::TemplatePrefix(prefix) => !prefix.is_empty() && actor.id.starts_with(prefix),
        }
    }
}

/// Position of the first entity matching `target` that has a `Position`.
/// Without a registry every entity is scanned in store order.
pub fn resolve_target(
    target: &str,
    registry: Option<&ActorRegistry>,
    entities: &EntityStore,
) -> Option<Vec2> {
    let target = TargetRef::parse(target)?;
    match registry {
        Some(registry) => {
            let candidates: Vec<EntityId> = match target {
                TargetRef::ActorId(id) => registry.find_by_id(id).into_iter().collect(),
                TargetRef::Archetype(archetype) => registry.find_by_archetype(archetype),
                TargetRef::TemplatePrefix(prefix) => registry.find_by_template_prefix(prefix),
            };
            candidates
                .into_iter()
                .filter_map(|id| entities.entity(id))
                .find_map(position_of)
        }
        None => entities
            .entities()
            .iter()
            .filter(|entity| entity.get::<Actor>().is_some_and(|actor| target.matches(actor)))
            .find_map(position_of),
    }
}

fn position_of(entity: &Entity) -> Option<Vec2> {
    entity.get::<Position>().map(|position| position.as_vec2())
}
