mod planet;
mod space;

use engine::content::ActorSpawner;
use engine::ecs::{Actor, Camera, CameraTarget, EntityId, PlayerInput, Position, Vec2};
use engine::events::SceneChangeEvent;
use engine::render::{Rgba, Surface};
use engine::systems::{Scene, SceneFactory};
use engine::{DrawContext, UpdateContext};
use tracing::{debug, info};

pub(crate) const PLAYER_TEMPLATE: &str = "player";

/// Static description of one demo scene.
#[derive(Debug)]
pub(crate) struct SceneLayout {
    pub(crate) name: &'static str,
    /// Scene Tab switches to.
    pub(crate) next: &'static str,
    pub(crate) backdrop: Rgba,
    /// Ground band as (fraction of the screen height where it starts, color).
    pub(crate) ground: Option<(f32, Rgba)>,
    pub(crate) player_spawn: Vec2,
    pub(crate) actors: &'static [(&'static str, f32, f32)],
}

pub(crate) fn layout(name: &str) -> Option<&'static SceneLayout> {
    match name {
        space::NAME => Some(&space::LAYOUT),
        planet::NAME => Some(&planet::LAYOUT),
        _ => None,
    }
}

pub(crate) fn factory(name: &str, spawner: &ActorSpawner) -> Option<SceneFactory> {
    let layout = layout(name)?;
    let spawner = spawner.clone();
    Some(SceneFactory::new(move || {
        Box::new(DemoScene::new(layout, spawner.clone()))
    }))
}

pub(crate) fn initial_scene(spawner: &ActorSpawner) -> Box<dyn Scene> {
    Box::new(DemoScene::new(&space::LAYOUT, spawner.clone()))
}

/// Spawns a player, a camera and the layout's actors; Tab queues the next scene.
pub(crate) struct DemoScene {
    layout: &'static SceneLayout,
    spawner: ActorSpawner,
    spawned: Vec<EntityId>,
    switch_queued: bool,
}

impl DemoScene {
    pub(crate) fn new(layout: &'static SceneLayout, spawner: ActorSpawner) -> Self {
        Self {
            layout,
            spawner,
            spawned: Vec::new(),
            switch_queued: false,
        }
    }

    fn spawn(&mut self, ctx: &mut UpdateContext<'_>, template: &str, at: Vec2) -> Option<EntityId> {
        let id = self.spawner.try_spawn(
            ctx.entities,
            ctx.events,
            template,
            Position::new(at.x, at.y),
        )?;
        self.spawned.push(id);
        Some(id)
    }
}

impl Scene for DemoScene {
    fn name(&self) -> &str {
        self.layout.name
    }

    fn init(&mut self, ctx: &mut UpdateContext<'_>) {
        let spawn = self.layout.player_spawn;
        if let Some(player) = self.spawn(ctx, PLAYER_TEMPLATE, spawn) {
            if let Some(entity) = ctx.entities.entity_mut(player) {
                entity.insert(PlayerInput::default()).insert(CameraTarget);
            }
        }
        let camera = ctx.entities.new_entity();
        camera.insert(Camera::at(spawn, 1.0));
        self.spawned.push(camera.id());

        for &(template, x, y) in self.layout.actors {
            if has_persistent_actor(ctx, template) {
                debug!(template, scene = self.layout.name, "persistent_actor_kept");
                continue;
            }
            self.spawn(ctx, template, Vec2::new(x, y));
        }
        info!(
            scene = self.layout.name,
            spawned = self.spawned.len(),
            "scene_populated"
        );
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.switch_queued || !ctx.input.switch_scene_pressed() {
            return;
        }
        if let Some(scene) = factory(self.layout.next, &self.spawner) {
            ctx.events.queue(SceneChangeEvent {
                target: self.layout.next.to_string(),
                scene,
            });
            self.switch_queued = true;
        }
    }

    fn draw(&mut self, _ctx: &DrawContext<'_>, surface: &mut dyn Surface) {
        surface.clear(self.layout.backdrop);
        if let Some((start, color)) = self.layout.ground {
            let (width, height) = surface.size();
            let top = (height as f32 * start.clamp(0.0, 1.0)) as u32;
            surface.fill_rect(0, top as i32, width, height.saturating_sub(top), color);
        }
    }

    /// Removes what this scene spawned, except persistent actors.
    fn unload(&mut self, ctx: &mut UpdateContext<'_>) {
        let mut kept = 0usize;
        for id in self.spawned.drain(..) {
            let persistent = ctx
                .entities
                .entity(id)
                .and_then(|entity| entity.get::<Actor>())
                .is_some_and(|actor| actor.persistent);
            if persistent {
                kept += 1;
            } else {
                ctx.entities.remove_entity(id);
            }
        }
        debug!(scene = self.layout.name, kept, "scene_unloaded");
    }
}

fn has_persistent_actor(ctx: &UpdateContext<'_>, template: &str) -> bool {
    let prefix = format!("{template}-");
    ctx.entities.entities().iter().any(|entity| {
        entity
            .get::<Actor>()
            .is_some_and(|actor| actor.persistent && actor.id.starts_with(&prefix))
    })
}
