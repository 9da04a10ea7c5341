mod bus;
mod types;

pub use bus::EventBus;
pub use types::{
    CameraZoomEvent, DataReloadRequested, DataReloaded, DebugToggleEvent, EntityMovedEvent,
    EntitySpawnedEvent, ReloadKind, SceneChangeEvent,
};
