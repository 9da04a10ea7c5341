//! Per-tick steering for entities carrying an [`AiController`].
//!
//! Evaluation runs in two passes over the store: target positions are
//! resolved against an immutable view first, then each controller is
//! stepped and its velocity written back.

mod behaviors;
mod catalog;
mod path;
mod steering;
mod target;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::content::ContentHandle;
use crate::ecs::{
    Actor, AiController, EntityId, EntityStore, Position, System, UpdateContext, Vec2, Velocity,
};
use crate::events::{DataReloaded, ReloadKind};
use crate::systems::actor::{ActorRegistry, ActorRegistryHandle};

pub use behaviors::{follow, pursue, retreat, retreat_thresholds, DEFAULT_RETREAT_TRIGGER};
pub use catalog::BehaviorCatalog;
pub use path::{advance, follow_path};
pub use steering::{directional_velocity, speed_for, WAYPOINT_TOLERANCE};
pub use target::{resolve_target, TargetRef};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ResolvedTargets {
    follow: Option<Vec2>,
    pursue: Option<Vec2>,
    retreat: Option<Vec2>,
}

impl ResolvedTargets {
    fn resolve(
        controller: &AiController,
        registry: Option<&ActorRegistry>,
        entities: &EntityStore,
    ) -> Self {
        let lookup = |target: &str| resolve_target(target, registry, entities);
        Self {
            follow: controller.follow.as_ref().and_then(|b| lookup(&b.target)),
            pursue: controller.pursue.as_ref().and_then(|b| lookup(&b.target)),
            retreat: controller.retreat.as_ref().and_then(|b| lookup(&b.target)),
        }
    }
}

pub struct AiSystem {
    content: Option<ContentHandle>,
    registry: Option<ActorRegistryHandle>,
    rng: StdRng,
    catalog: Option<BehaviorCatalog>,
    composed: HashSet<EntityId>,
    /// Entities whose controller came from a catalog that has since been reloaded.
    stale: HashSet<EntityId>,
    catalog_dirty: Arc<AtomicBool>,
    subscribed: bool,
}

impl AiSystem {
    pub fn new() -> Self {
        Self {
            content: None,
            registry: None,
            rng: StdRng::from_os_rng(),
            catalog: None,
            composed: HashSet::new(),
            stale: HashSet::new(),
            catalog_dirty: Arc::new(AtomicBool::new(false)),
            subscribed: false,
        }
    }

    /// Enables controller composition from `Actor.behaviors`.
    pub fn with_content(mut self, content: ContentHandle) -> Self {
        self.content = Some(content);
        self
    }

    /// Resolves targets through the registry instead of scanning the store.
    pub fn with_registry(mut self, registry: ActorRegistryHandle) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn subscribe_reloads(&mut self, ctx: &UpdateContext<'_>) {
        if self.subscribed {
            return;
        }
        self.subscribed = true;
        let dirty = Arc::clone(&self.catalog_dirty);
        ctx.events.subscribe(move |event: &DataReloaded| {
            if event.kind.covers(ReloadKind::AiCatalog) {
                dirty.store(true, Ordering::Release);
            }
        });
    }

    fn invalidate_catalog(&mut self) {
        self.catalog = None;
        self.stale.extend(self.composed.drain());
        info!(stale_count = self.stale.len(), "behavior_catalog_invalidated");
    }

    fn compose_controllers(&mut self, entities: &mut EntityStore) {
        self.composed.retain(|id| entities.contains(*id));
        let Some(content) = &self.content else {
            return;
        };
        for entity in entities.entities_mut() {
            let id = entity.id();
            let recompose = self.stale.remove(&id);
            if self.composed.contains(&id) || (!recompose && entity.get::<AiController>().is_some()) {
                continue;
            }
            let Some(actor) = entity.get::<Actor>() else {
                continue;
            };
            if actor.behaviors.is_empty() {
                continue;
            }

            let catalog = self
                .catalog
                .get_or_insert_with(|| BehaviorCatalog::compile(&content.ai_catalog()));
            let controller = catalog.compose(&actor.behaviors);
            self.composed.insert(id);
            match controller {
                Some(controller) => {
                    debug!(entity = id.0, actor = %actor.id, "ai_controller_composed");
                    entity.set(controller);
                }
                None if recompose => {
                    debug!(entity = id.0, "ai_controller_dropped_after_reload");
                    entity.remove::<AiController>();
                }
                None => {
                    debug!(entity = id.0, actor = %actor.id, "ai_behaviors_unresolved");
                }
            }
        }
        self.stale.clear();
    }
}

impl Default for AiSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AiSystem {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.subscribe_reloads(ctx);
        if self.catalog_dirty.swap(false, Ordering::AcqRel) {
            self.invalidate_catalog();
        }
        self.compose_controllers(ctx.entities);

        let guard = self.registry.as_ref().map(ActorRegistryHandle::read);
        evaluate_all(&mut self.rng, ctx.entities, guard.as_deref());
    }
}

/// Steps every active controller with a `Position`. Returns the number of
/// entities evaluated.
pub fn evaluate_all<R: Rng>(
    rng: &mut R,
    entities: &mut EntityStore,
    registry: Option<&ActorRegistry>,
) -> usize {
    let plans: Vec<(usize, ResolvedTargets)> = entities
        .entities()
        .iter()
        .enumerate()
        .filter_map(|(index, entity)| {
            let controller = entity.get::<AiController>()?;
            if !controller.active || entity.get::<Position>().is_none() {
                return None;
            }
            Some((index, ResolvedTargets::resolve(controller, registry, entities)))
        })
        .collect();

    let slots = entities.entities_mut();
    for (index, targets) in &plans {
        let entity = &mut slots[*index];
        let Some(position) = entity.get::<Position>().map(|p| p.as_vec2()) else {
            continue;
        };
        let Some(controller) = entity.get_mut::<AiController>() else {
            continue;
        };
        let velocity = evaluate(controller, position, targets, rng).unwrap_or(Vec2::ZERO);
        entity.set(Velocity::from_vec2(velocity));
    }
    plans.len()
}

/// Retreat, travel, patrol, pursue, follow: the first behavior to claim wins.
fn evaluate<R: Rng>(
    controller: &mut AiController,
    position: Vec2,
    targets: &ResolvedTargets,
    rng: &mut R,
) -> Option<Vec2> {
    let speed = controller.speed;

    if let (Some(behavior), Some(target)) = (&controller.retreat, targets.retreat) {
        if let Some(velocity) =
            retreat(behavior, &mut controller.retreating, position, target, speed)
        {
            return Some(velocity);
        }
    }
    if let Some(travel) = &controller.travel {
        if let Some(velocity) =
            follow_path(travel, &mut controller.travel_state, position, speed, rng)
        {
            return Some(velocity);
        }
    }
    if let Some(patrol) = &controller.patrol {
        if let Some(velocity) =
            follow_path(patrol, &mut controller.patrol_state, position, speed, rng)
        {
            return Some(velocity);
        }
    }
    if let (Some(behavior), Some(target)) = (&controller.pursue, targets.pursue) {
        if let Some(velocity) = pursue(behavior, position, target, speed) {
            return Some(velocity);
        }
    }
    if let (Some(behavior), Some(target)) = (&controller.follow, targets.follow) {
        return follow(behavior, position, target, speed);
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content::{AiActionTemplate, AiCatalog, ContentSet};
    use crate::ecs::{
        FollowBehavior, PathBehavior, PathState, PathVariant, PursueBehavior, RetreatBehavior,
        SystemDescriptor, World,
    };
    use crate::events::{DataReloaded, EventBus, ReloadKind};
    use crate::input::InputSnapshot;
    use crate::systems::actor::ActorSystem;

    fn world_with_ai(ai: AiSystem) -> World {
        let mut world = World::new();
        let actors = ActorSystem::new();
        let registry = actors.registry();
        world.add_system(Box::new(actors), SystemDescriptor::new());
        world.add_system(
            Box::new(ai.with_registry(registry).with_seed(7)),
            SystemDescriptor::new().with_priority(20),
        );
        world
    }

    fn spawn_actor(world: &mut World, id: &str, position: Position) -> EntityId {
        let entity = world.new_entity();
        entity
            .insert(Actor {
                id: id.to_string(),
                ..Actor::default()
            })
            .insert(position);
        entity.id()
    }

    fn velocity_of(world: &World, id: EntityId) -> Option<Velocity> {
        world.entity(id).and_then(|entity| entity.get::<Velocity>()).copied()
    }

    fn set_position(world: &mut World, id: EntityId, position: Position) {
        if let Some(entity) = world.entity_mut(id) {
            entity.set(position);
        }
    }

    #[test]
    fn pursue_engages_only_inside_range() {
        let mut world = world_with_ai(AiSystem::new());
        let player = spawn_actor(&mut world, "player", Position::new(200.0, 0.0));
        let hunter = spawn_actor(&mut world, "hunter", Position::new(0.0, 0.0));
        let mut controller = AiController::default();
        controller.set_pursue(PursueBehavior {
            target: "player".to_string(),
            engage_distance: 100.0,
            speed: 4.0,
        });
        if let Some(entity) = world.entity_mut(hunter) {
            entity.insert(controller);
        }

        world.update();
        assert_eq!(velocity_of(&world, hunter), Some(Velocity::new(0.0, 0.0)));

        set_position(&mut world, player, Position::new(60.0, 0.0));
        world.update();
        let velocity = velocity_of(&world, hunter).expect("velocity");
        assert!(velocity.vx > 0.0);
    }

    #[test]
    fn pingpong_patrol_advances_and_bounces() {
        let mut world = world_with_ai(AiSystem::new());
        let guard = spawn_actor(&mut world, "guard", Position::new(260.0, 220.0));
        let mut controller = AiController::default();
        controller.set_patrol(PathBehavior {
            variant: PathVariant::PingPong,
            waypoints: vec![Vec2::new(260.0, 220.0), Vec2::new(300.0, 220.0)],
            speed: 0.0,
        });
        if let Some(entity) = world.entity_mut(guard) {
            entity.insert(controller);
        }

        world.update();
        let state = |world: &World| {
            world
                .entity(guard)
                .and_then(|entity| entity.get::<AiController>())
                .map(|controller| controller.patrol_state)
                .expect("controller")
        };
        assert_eq!(state(&world).index, 1);
        assert!(velocity_of(&world, guard).expect("velocity").vx > 0.0);

        set_position(&mut world, guard, Position::new(300.0, 220.0));
        world.update();
        let bounced = state(&world);
        assert_eq!(bounced.index, 0);
        assert!(!bounced.forward);
        assert!(velocity_of(&world, guard).expect("velocity").vx < 0.0);
    }

    #[test]
    fn retreat_outranks_patrol_and_unresolved_target_defers() {
        let mut world = world_with_ai(AiSystem::new());
        let threat = spawn_actor(&mut world, "threat", Position::new(0.0, 0.0));
        let scout = spawn_actor(&mut world, "scout", Position::new(50.0, 0.0));
        let mut controller = AiController::default();
        controller.set_retreat(RetreatBehavior {
            target: "threat".to_string(),
            trigger_distance: 100.0,
            safe_distance: 200.0,
            speed: 3.0,
        });
        controller.set_patrol(PathBehavior {
            variant: PathVariant::Loop,
            waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 100.0)],
            speed: 1.0,
        });
        if let Some(entity) = world.entity_mut(scout) {
            entity.insert(controller);
        }

        world.update();
        assert_eq!(velocity_of(&world, scout), Some(Velocity::new(3.0, 0.0)));

        world.remove_entity(threat);
        world.update();
        let patrol = velocity_of(&world, scout).expect("velocity");
        assert!(patrol.vx < 0.0);
        assert!(patrol.vx.abs() <= 1.0 + 1e-5);
    }

    #[test]
    fn inactive_controller_and_missing_position_are_skipped() {
        let mut store = EntityStore::new();
        let idle = {
            let entity = store.new_entity();
            entity
                .insert(Position::new(0.0, 0.0))
                .insert(Velocity::new(9.0, 9.0))
                .insert(AiController {
                    active: false,
                    ..AiController::default()
                });
            entity.id()
        };
        store.new_entity().insert(AiController::default());

        let evaluated = evaluate_all(&mut StdRng::seed_from_u64(1), &mut store, None);
        assert_eq!(evaluated, 0);
        let velocity = store.entity(idle).and_then(|e| e.get::<Velocity>()).copied();
        assert_eq!(velocity, Some(Velocity::new(9.0, 9.0)));
    }

    #[test]
    fn controller_without_claim_gets_zero_velocity_created() {
        let mut store = EntityStore::new();
        let id = {
            let entity = store.new_entity();
            entity
                .insert(Position::new(0.0, 0.0))
                .insert(AiController::default());
            entity.id()
        };

        assert_eq!(evaluate_all(&mut StdRng::seed_from_u64(1), &mut store, None), 1);
        let velocity = store.entity(id).and_then(|e| e.get::<Velocity>()).copied();
        assert_eq!(velocity, Some(Velocity::new(0.0, 0.0)));
    }

    fn catalog_with_speed(speed: f32) -> AiCatalog {
        AiCatalog {
            actions: vec![AiActionTemplate {
                name: "hunt".to_string(),
                kind: "pursue".to_string(),
                priority: 0,
                params: json!({"target": "player", "speed": speed}),
            }],
        }
    }

    #[test]
    fn behaviors_compose_and_recompose_after_catalog_reload() {
        let content = ContentHandle::new(ContentSet::new(
            Default::default(),
            catalog_with_speed(1.0),
            Default::default(),
        ));
        let mut world = world_with_ai(AiSystem::new().with_content(content.clone()));
        spawn_actor(&mut world, "player", Position::new(100.0, 0.0));
        let hunter = {
            let entity = world.new_entity();
            entity
                .insert(Actor {
                    id: "hunter".to_string(),
                    behaviors: vec!["hunt".to_string(), "missing".to_string()],
                    ..Actor::default()
                })
                .insert(Position::new(0.0, 0.0));
            entity.id()
        };

        world.update();
        assert_eq!(velocity_of(&world, hunter), Some(Velocity::new(1.0, 0.0)));

        content.replace_ai_catalog(catalog_with_speed(5.0));
        world.events().queue(DataReloaded {
            path: "ai.json".into(),
            kind: ReloadKind::AiCatalog,
        });
        world.update();
        world.update();
        assert_eq!(velocity_of(&world, hunter), Some(Velocity::new(5.0, 0.0)));
    }

    #[test]
    fn composed_set_forgets_removed_entities() {
        let content = ContentHandle::new(ContentSet::new(
            Default::default(),
            catalog_with_speed(1.0),
            Default::default(),
        ));
        let mut ai = AiSystem::new().with_content(content).with_seed(3);
        let mut store = EntityStore::new();
        let hunters: Vec<EntityId> = (0..3)
            .map(|n| {
                let entity = store.new_entity();
                entity
                    .insert(Actor {
                        id: format!("hunter-{n}"),
                        behaviors: vec!["hunt".to_string()],
                        ..Actor::default()
                    })
                    .insert(Position::new(0.0, 0.0));
                entity.id()
            })
            .collect();
        let events = EventBus::new();
        let input = InputSnapshot::empty();
        let tick = |ai: &mut AiSystem, store: &mut EntityStore| {
            let mut ctx = UpdateContext {
                entities: store,
                events: &events,
                input: &input,
                frame: 0,
            };
            ai.update(&mut ctx);
        };

        tick(&mut ai, &mut store);
        assert_eq!(ai.composed.len(), 3);

        store.remove_entity(hunters[0]);
        store.remove_entity(hunters[2]);
        tick(&mut ai, &mut store);
        assert_eq!(ai.composed.len(), 1);
        assert!(ai.composed.contains(&hunters[1]));
    }

    fn steered(controller: AiController, position: Position) -> (EntityStore, EntityId) {
        let mut store = EntityStore::new();
        store
            .new_entity()
            .insert(Actor {
                id: "player".to_string(),
                ..Actor::default()
            })
            .insert(Position::new(200.0, 0.0));
        let id = {
            let entity = store.new_entity();
            entity.insert(controller).insert(position);
            entity.id()
        };
        (store, id)
    }

    fn step(store: &mut EntityStore, id: EntityId) -> (Velocity, AiController) {
        evaluate_all(&mut StdRng::seed_from_u64(5), store, None);
        let entity = store.entity(id).expect("entity");
        (
            entity.get::<Velocity>().copied().expect("velocity"),
            entity.get::<AiController>().cloned().expect("controller"),
        )
    }

    fn ring_patrol() -> PathBehavior {
        PathBehavior {
            variant: PathVariant::Loop,
            waypoints: vec![Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0)],
            speed: 1.0,
        }
    }

    #[test]
    fn travel_outranks_patrol_and_leaves_patrol_state_alone() {
        let mut controller = AiController::default();
        controller.set_patrol(ring_patrol());
        controller.set_travel(PathBehavior {
            variant: PathVariant::Loop,
            waypoints: vec![Vec2::new(0.0, 50.0)],
            speed: 1.0,
        });
        controller.set_pursue(PursueBehavior {
            target: "player".to_string(),
            ..PursueBehavior::default()
        });
        let (mut store, id) = steered(controller, Position::new(0.0, 0.0));

        let (velocity, controller) = step(&mut store, id);
        assert_eq!(velocity, Velocity::new(0.0, 1.0));
        assert_eq!(controller.patrol_state, PathState::default());
    }

    #[test]
    fn finished_once_travel_parks_before_patrol() {
        let mut controller = AiController::default();
        controller.set_patrol(ring_patrol());
        controller.set_travel(PathBehavior {
            variant: PathVariant::Once,
            waypoints: vec![Vec2::new(0.0, 2.0)],
            speed: 1.0,
        });
        let (mut store, id) = steered(controller, Position::new(0.0, 0.0));

        let (velocity, controller) = step(&mut store, id);
        assert_eq!(velocity, Velocity::new(0.0, 0.0));
        assert!(controller.travel_state.completed);

        let (velocity, controller) = step(&mut store, id);
        assert_eq!(velocity, Velocity::new(0.0, 0.0));
        assert!(controller.travel_state.completed);
        assert_eq!(controller.patrol_state, PathState::default());
    }

    #[test]
    fn pursue_out_of_range_falls_through_to_follow() {
        let mut controller = AiController::default();
        controller.set_pursue(PursueBehavior {
            target: "player".to_string(),
            engage_distance: 100.0,
            speed: 4.0,
        });
        controller.set_follow(FollowBehavior {
            target: "player".to_string(),
            speed: 2.0,
            ..FollowBehavior::default()
        });
        let (mut store, id) = steered(controller, Position::new(0.0, 0.0));

        let (velocity, _) = step(&mut store, id);
        assert_eq!(velocity, Velocity::new(2.0, 0.0));

        if let Some(position) = store.entity_mut(id).and_then(|e| e.get_mut::<Position>()) {
            *position = Position::new(150.0, 0.0);
        }
        let (velocity, _) = step(&mut store, id);
        assert_eq!(velocity, Velocity::new(4.0, 0.0));
    }
}
