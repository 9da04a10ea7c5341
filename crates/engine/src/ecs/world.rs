use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::events::EventBus;
use crate::input::InputSnapshot;
use crate::render::Surface;

use super::components::ComponentKind;
use super::entity::{Entity, EntityId};
use super::layers::{DrawLayer, LayerGroup};
use super::store::EntityStore;
use super::system::{DrawContext, System, SystemDescriptor, UpdateContext};

struct ScheduledSystem {
    system: Box<dyn System>,
    priority: i32,
    order: u64,
    layer: Option<DrawLayer>,
}

impl ScheduledSystem {
    fn sort_key(&self) -> (i32, u64) {
        (self.priority, self.order)
    }
}

/// Canonical `(priority, insertion order)` list plus per-layer draw buckets.
struct Schedule {
    systems: Vec<ScheduledSystem>,
    next_order: u64,
    buckets: BTreeMap<DrawLayer, Vec<usize>>,
    world_layers: Vec<DrawLayer>,
    overlay_layers: Vec<DrawLayer>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
            next_order: 0,
            buckets: BTreeMap::new(),
            world_layers: DrawLayer::WORLD_GROUP.to_vec(),
            overlay_layers: DrawLayer::OVERLAY_GROUP.to_vec(),
        }
    }
}

impl Schedule {
    fn insert(&mut self, system: Box<dyn System>, descriptor: SystemDescriptor) {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        if let Some(layer) = descriptor.layer {
            self.remember_layer(layer);
        }
        self.systems.push(ScheduledSystem {
            system,
            priority: descriptor.priority,
            order,
            layer: descriptor.layer,
        });
        self.systems.sort_by_key(ScheduledSystem::sort_key);
        self.rebuild_buckets();
    }

    fn remember_layer(&mut self, layer: DrawLayer) {
        let group = match layer.group() {
            LayerGroup::World => &mut self.world_layers,
            LayerGroup::Overlay => &mut self.overlay_layers,
        };
        if let Err(index) = group.binary_search(&layer) {
            group.insert(index, layer);
            info!(layer = layer.0, group = ?layer.group(), "custom_draw_layer_registered");
        }
    }

    fn rebuild_buckets(&mut self) {
        self.buckets.clear();
        for (index, scheduled) in self.systems.iter().enumerate() {
            if let Some(layer) = scheduled.layer {
                self.buckets.entry(layer).or_default().push(index);
            }
        }
    }

    fn draw_layer(&mut self, ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        let Some(indices) = self.buckets.get(&ctx.layer) else {
            return;
        };
        for &index in indices {
            self.systems[index].system.draw(ctx, surface);
        }
    }
}

/// Owns every entity and the ordered system list; the host drives it with
/// `update` once per tick and the draw passes once per frame.
pub struct World {
    entities: EntityStore,
    events: EventBus,
    schedule: Schedule,
    input: InputSnapshot,
    frame: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_events(EventBus::new())
    }

    /// Builds a world around an existing bus so collaborators created earlier share it.
    pub fn with_events(events: EventBus) -> Self {
        Self {
            entities: EntityStore::new(),
            events,
            schedule: Schedule::default(),
            input: InputSnapshot::empty(),
            frame: 0,
        }
    }

    pub fn add_system(&mut self, system: Box<dyn System>, descriptor: SystemDescriptor) {
        debug!(
            system = system.name(),
            priority = descriptor.priority,
            layer = ?descriptor.layer,
            "system_registered"
        );
        self.schedule.insert(system, descriptor);
    }

    /// Runs every system once in canonical order, then flushes queued events.
    pub fn update(&mut self) {
        self.frame = self.frame.saturating_add(1);
        let mut ctx = UpdateContext {
            entities: &mut self.entities,
            events: &self.events,
            input: &self.input,
            frame: self.frame,
        };
        for scheduled in &mut self.schedule.systems {
            scheduled.system.update(&mut ctx);
        }
        self.events.flush();
    }

    pub fn draw_world(&mut self, surface: &mut dyn Surface) {
        let layers = self.schedule.world_layers.clone();
        for layer in layers {
            self.draw_layer(surface, layer);
        }
    }

    pub fn draw_overlay(&mut self, surface: &mut dyn Surface) {
        let layers = self.schedule.overlay_layers.clone();
        for layer in layers {
            self.draw_layer(surface, layer);
        }
    }

    pub fn draw_layer(&mut self, surface: &mut dyn Surface, layer: DrawLayer) {
        let ctx = DrawContext {
            entities: &self.entities,
            events: &self.events,
            layer,
        };
        self.schedule.draw_layer(&ctx, surface);
    }

    pub fn new_entity(&mut self) -> &mut Entity {
        self.entities.new_entity()
    }

    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.entities.remove_entity(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.entity(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.entity_mut(id)
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    pub fn for_each(&self, visit: impl FnMut(&Entity)) {
        self.entities.for_each(visit);
    }

    pub fn find_by_component(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.entities.find_by_component(kind)
    }

    pub fn count(&self) -> usize {
        self.entities.count()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Number of completed `update` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn system_count(&self) -> usize {
        self.schedule.systems.len()
    }

    pub fn system_order(&self) -> Vec<&'static str> {
        self.schedule
            .systems
            .iter()
            .map(|scheduled| scheduled.system.name())
            .collect()
    }

    pub fn layer_order(&self, layer: DrawLayer) -> Vec<&'static str> {
        self.schedule
            .buckets
            .get(&layer)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| self.schedule.systems[index].system.name())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn world_layers(&self) -> &[DrawLayer] {
        &self.schedule.world_layers
    }

    pub fn overlay_layers(&self) -> &[DrawLayer] {
        &self.schedule.overlay_layers
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ecs::{Position, Velocity};
    use crate::render::FrameSurface;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
            self.log.lock().expect("log").push(format!("update:{}", self.name));
        }

        fn draw(&mut self, ctx: &DrawContext<'_>, _surface: &mut dyn Surface) {
            self.log
                .lock()
                .expect("log")
                .push(format!("draw:{}:{}", ctx.layer, self.name));
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Box<dyn System> {
        Box::new(Recorder {
            name,
            log: Arc::clone(log),
        })
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().expect("log"))
    }

    fn with_surface(run: impl FnOnce(&mut dyn Surface)) {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut surface = FrameSurface::new(&mut frame, 4, 4);
        run(&mut surface);
    }

    #[test]
    fn update_runs_systems_by_priority_then_insertion() {
        let log = Log::default();
        let mut world = World::new();
        world.add_system(recorder("late", &log), SystemDescriptor::new().with_priority(10));
        world.add_system(recorder("first_zero", &log), SystemDescriptor::new());
        world.add_system(recorder("early", &log), SystemDescriptor::new().with_priority(-5));
        world.add_system(recorder("second_zero", &log), SystemDescriptor::new());

        world.update();

        assert_eq!(
            take(&log),
            vec![
                "update:early",
                "update:first_zero",
                "update:second_zero",
                "update:late"
            ]
        );
        assert_eq!(
            world.system_order(),
            vec!["early", "first_zero", "second_zero", "late"]
        );
        assert_eq!(world.frame(), 1);
    }

    #[test]
    fn layered_systems_draw_only_in_their_group() {
        let log = Log::default();
        let mut world = World::new();
        world.add_system(
            recorder("hud", &log),
            SystemDescriptor::new().on_layer(DrawLayer::HUD),
        );
        world.add_system(
            recorder("sprites", &log),
            SystemDescriptor::new().on_layer(DrawLayer::WORLD),
        );
        world.add_system(
            recorder("stars", &log),
            SystemDescriptor::new()
                .with_priority(5)
                .on_layer(DrawLayer::BACKGROUND),
        );
        world.add_system(recorder("logic_only", &log), SystemDescriptor::new());

        with_surface(|surface| world.draw_world(surface));
        assert_eq!(
            take(&log),
            vec!["draw:background:stars", "draw:world:sprites"]
        );

        with_surface(|surface| world.draw_overlay(surface));
        assert_eq!(take(&log), vec!["draw:hud:hud"]);

        with_surface(|surface| world.draw_layer(surface, DrawLayer::WORLD));
        assert_eq!(take(&log), vec!["draw:world:sprites"]);
    }

    #[test]
    fn layer_bucket_respects_priority_independent_of_update_list() {
        let log = Log::default();
        let mut world = World::new();
        world.add_system(
            recorder("b", &log),
            SystemDescriptor::new().with_priority(3).on_layer(DrawLayer::DEBUG),
        );
        world.add_system(
            recorder("a", &log),
            SystemDescriptor::new().with_priority(1).on_layer(DrawLayer::DEBUG),
        );
        world.add_system(
            recorder("c", &log),
            SystemDescriptor::new().with_priority(3).on_layer(DrawLayer::DEBUG),
        );

        assert_eq!(world.layer_order(DrawLayer::DEBUG), vec!["a", "b", "c"]);
        with_surface(|surface| world.draw_layer(surface, DrawLayer::DEBUG));
        assert_eq!(take(&log), vec!["draw:debug:a", "draw:debug:b", "draw:debug:c"]);
    }

    #[test]
    fn custom_layers_join_group_in_numeric_order() {
        let log = Log::default();
        let mut world = World::new();
        world.add_system(
            recorder("mid_world", &log),
            SystemDescriptor::new().on_layer(DrawLayer(150)),
        );
        world.add_system(
            recorder("late_overlay", &log),
            SystemDescriptor::new().on_layer(DrawLayer(5000)),
        );
        world.add_system(
            recorder("foreground", &log),
            SystemDescriptor::new().on_layer(DrawLayer::FOREGROUND),
        );
        world.add_system(
            recorder("world", &log),
            SystemDescriptor::new().on_layer(DrawLayer::WORLD),
        );

        assert!(world.world_layers().contains(&DrawLayer(150)));
        assert!(world.overlay_layers().contains(&DrawLayer(5000)));

        with_surface(|surface| world.draw_world(surface));
        assert_eq!(
            take(&log),
            vec![
                "draw:world:world",
                "draw:custom(150):mid_world",
                "draw:foreground:foreground"
            ]
        );
        with_surface(|surface| world.draw_overlay(surface));
        assert_eq!(take(&log), vec!["draw:custom(5000):late_overlay"]);
    }

    #[test]
    fn drawing_an_empty_layer_is_a_no_op() {
        let mut world = World::new();
        with_surface(|surface| world.draw_layer(surface, DrawLayer::CONSOLE));
        with_surface(|surface| world.draw_layer(surface, DrawLayer(77)));
        assert!(world.layer_order(DrawLayer(77)).is_empty());
    }

    #[test]
    fn entities_survive_removal_of_neighbors_in_order() {
        let mut world = World::new();
        let a = world.new_entity().insert(Position::new(0.0, 0.0)).id();
        let b = world.new_entity().insert(Velocity::new(1.0, 0.0)).id();
        let c = world.new_entity().insert(Position::new(2.0, 0.0)).id();

        assert!(world.remove_entity(b));
        assert!(!world.remove_entity(b));

        let mut seen = Vec::new();
        world.for_each(|entity| seen.push(entity.id()));
        assert_eq!(seen, vec![a, c]);
        assert_eq!(world.find_by_component(ComponentKind::Position), vec![a, c]);
        assert_eq!(world.count(), 2);
    }

    #[test]
    fn queued_events_are_flushed_after_all_systems() {
        struct Emitter;
        impl System for Emitter {
            fn name(&self) -> &'static str {
                "emitter"
            }
            fn update(&mut self, ctx: &mut UpdateContext<'_>) {
                ctx.events.queue(ctx.frame);
            }
        }

        let log = Log::default();
        let mut world = World::new();
        let sink = Arc::clone(&log);
        world
            .events()
            .subscribe(move |frame: &u64| sink.lock().expect("log").push(format!("event:{frame}")));
        world.add_system(Box::new(Emitter), SystemDescriptor::new());
        world.add_system(recorder("after", &log), SystemDescriptor::new().with_priority(1));

        world.update();

        assert_eq!(take(&log), vec!["update:after", "event:1"]);
        assert_eq!(world.events().pending_count(), 0);
    }
}
