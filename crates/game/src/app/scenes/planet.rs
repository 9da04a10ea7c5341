use engine::ecs::Vec2;

use super::SceneLayout;

pub(crate) const NAME: &str = "planet";

pub(crate) static LAYOUT: SceneLayout = SceneLayout {
    name: NAME,
    next: super::space::NAME,
    backdrop: [34, 22, 48, 255],
    ground: Some((0.62, [58, 44, 36, 255])),
    player_spawn: Vec2 { x: -60.0, y: 120.0 },
    actors: &[
        ("grazer", -240.0, 110.0),
        ("grazer", 20.0, 150.0),
        ("grazer", 180.0, 100.0),
        ("freighter", -500.0, 240.0),
        ("drifter", 60.0, 60.0),
        ("drifter", -140.0, 40.0),
    ],
};
