use engine::content::{ContentHandle, ContentSource, EmbeddedContent};
use engine::ecs::{DrawLayer, SystemDescriptor, World};
use engine::systems::{
    priorities, ActorSystem, AiSystem, CameraSystem, DataSystem, DebugOverlaySystem, InputSystem,
    MovementSystem, SceneManager, SpriteRenderSystem, StarfieldSystem,
};
use engine::{resolve_app_paths, run_app, ActorSpawner, AppError, AppPaths, LoopConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::scenes;

const STARFIELD_SEED: u64 = 0x5eed_5ca1e;

pub(crate) const EMBEDDED: EmbeddedContent = EmbeddedContent {
    actors: include_str!("../../data/actors.json"),
    ai_catalog: include_str!("../../data/ai.json"),
    render_config: include_str!("../../data/render_config.json"),
};

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn run() -> Result<(), AppError> {
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        data_dir = %paths.data_dir.display(),
        assets_dir = %paths.assets_dir.display(),
        "startup"
    );

    let source = ContentSource::new(paths.data_dir.clone(), EMBEDDED);
    let content = ContentHandle::new(source.load_all()?);
    let config = LoopConfig::from_render_config(&content.render_config());
    let world = build_world(&paths, source, content);
    run_app(config, world)
}

/// Registers every system in tick order and on its draw layer.
pub(crate) fn build_world(paths: &AppPaths, source: ContentSource, content: ContentHandle) -> World {
    let mut world = World::new();
    let spawner = ActorSpawner::new(content.clone());
    spawner.subscribe_reloads(world.events());
    let camera_config = content.render_config().camera;

    let actors = ActorSystem::new();
    let registry = actors.registry();

    world.add_system(
        Box::new(DataSystem::new(source, content.clone())),
        SystemDescriptor::new().with_priority(priorities::DATA),
    );
    world.add_system(
        Box::new(SceneManager::with_initial(scenes::initial_scene(&spawner))),
        SystemDescriptor::new()
            .with_priority(priorities::SCENE)
            .on_layer(DrawLayer::BACKGROUND),
    );
    world.add_system(
        Box::new(actors),
        SystemDescriptor::new().with_priority(priorities::ACTOR),
    );
    world.add_system(
        Box::new(InputSystem::new()),
        SystemDescriptor::new().with_priority(priorities::INPUT),
    );
    world.add_system(
        Box::new(AiSystem::new().with_content(content).with_registry(registry)),
        SystemDescriptor::new().with_priority(priorities::AI),
    );
    world.add_system(
        Box::new(MovementSystem::new()),
        SystemDescriptor::new().with_priority(priorities::MOVEMENT),
    );
    world.add_system(
        Box::new(CameraSystem::new(camera_config)),
        SystemDescriptor::new().with_priority(priorities::CAMERA),
    );
    world.add_system(
        Box::new(StarfieldSystem::new(STARFIELD_SEED)),
        SystemDescriptor::new().on_layer(DrawLayer::BACKGROUND),
    );
    world.add_system(
        Box::new(SpriteRenderSystem::new(&paths.assets_dir)),
        SystemDescriptor::new().on_layer(DrawLayer::WORLD),
    );
    world.add_system(
        Box::new(DebugOverlaySystem::default()),
        SystemDescriptor::new().on_layer(DrawLayer::DEBUG),
    );
    world
}

/// Content straight from the compiled-in data files.
#[cfg(test)]
pub(crate) fn embedded_content() -> Result<ContentHandle, engine::ContentError> {
    use engine::content::{
        parse_document, ContentSet, ACTORS_FILE, AI_CATALOG_FILE, RENDER_CONFIG_FILE,
    };

    Ok(ContentHandle::new(ContentSet::new(
        parse_document(ACTORS_FILE, EMBEDDED.actors)?,
        parse_document(AI_CATALOG_FILE, EMBEDDED.ai_catalog)?,
        parse_document(RENDER_CONFIG_FILE, EMBEDDED.render_config)?,
    )))
}
