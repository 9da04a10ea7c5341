use engine::ecs::Vec2;

use super::SceneLayout;

pub(crate) const NAME: &str = "space";

pub(crate) static LAYOUT: SceneLayout = SceneLayout {
    name: NAME,
    next: super::planet::NAME,
    backdrop: [6, 8, 20, 255],
    ground: None,
    player_spawn: Vec2 { x: 0.0, y: 0.0 },
    actors: &[
        ("scout", -120.0, 80.0),
        ("scout", 140.0, -60.0),
        ("sentry", -200.0, -200.0),
        ("raider", 360.0, -120.0),
        ("freighter", -500.0, 240.0),
        ("beacon", 200.0, -200.0),
        ("beacon", -200.0, 200.0),
    ],
};
