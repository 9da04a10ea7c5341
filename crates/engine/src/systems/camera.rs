use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::content::CameraConfig;
use crate::ecs::{Camera, ComponentKind, Position, System, UpdateContext};
use crate::events::CameraZoomEvent;
use crate::input::{InputAction, InputSnapshot};

pub const CAMERA_ROTATION_STEP: f32 = 0.03;
const ZOOM_SNAP_EPSILON: f32 = 1e-4;

static ZOOM_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_zoom_lock_poison_once(operation: &'static str) {
    if ZOOM_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "camera zoom lock poisoned; recovered inner value");
    }
}

/// Eases the first `Camera` toward the first `CameraTarget` and applies zoom
/// and rotation requests.
#[derive(Debug)]
pub struct CameraSystem {
    config: CameraConfig,
    requested_scale: Arc<Mutex<Option<f32>>>,
    subscribed: bool,
}

impl CameraSystem {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config: config.normalized(),
            requested_scale: Arc::new(Mutex::new(None)),
            subscribed: false,
        }
    }

    pub fn config(&self) -> CameraConfig {
        self.config
    }

    fn take_requested_scale(&self) -> Option<f32> {
        match self.requested_scale.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => {
                warn_zoom_lock_poison_once("take");
                poisoned.into_inner().take()
            }
        }
    }
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl System for CameraSystem {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if !self.subscribed {
            self.subscribed = true;
            let slot = Arc::clone(&self.requested_scale);
            ctx.events.subscribe(move |event: &CameraZoomEvent| {
                let mut pending = match slot.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => {
                        warn_zoom_lock_poison_once("request");
                        poisoned.into_inner()
                    }
                };
                *pending = Some(event.scale);
            });
        }
        let requested = self.take_requested_scale();

        let target = ctx
            .entities
            .entities()
            .iter()
            .find(|entity| entity.has(ComponentKind::CameraTarget))
            .and_then(|entity| {
                entity
                    .get::<Position>()
                    .map(|position| (entity.id(), position.as_vec2()))
            });
        let Some((_, camera)) = ctx.entities.first_component_mut::<Camera>() else {
            return;
        };

        apply_limits(camera, &self.config);
        if let Some(scale) = requested {
            debug!(scale, "camera_zoom_requested");
            camera.target_scale = clamp_scale(camera, scale);
        }
        apply_input(camera, ctx.input, &self.config);

        if let Some((target_id, target_position)) = target {
            camera.target = Some(target_id);
            let lerp = self.config.follow_lerp;
            camera.position = camera
                .position
                .add(target_position.sub(camera.position).scale(lerp));
        }
        ease_scale(camera, self.config.zoom_lerp);
    }
}

/// Fills unset camera limits from config and keeps scales inside them.
fn apply_limits(camera: &mut Camera, config: &CameraConfig) {
    if camera.min_scale <= 0.0 {
        camera.min_scale = config.min_scale;
    }
    if camera.max_scale <= 0.0 {
        camera.max_scale = config.max_scale;
    }
    if camera.max_scale < camera.min_scale {
        camera.max_scale = camera.min_scale;
    }
    if camera.default_scale <= 0.0 {
        camera.default_scale = clamp_scale(camera, camera.effective_scale());
    }
    camera.target_scale = if camera.target_scale <= 0.0 {
        clamp_scale(camera, camera.effective_scale())
    } else {
        clamp_scale(camera, camera.target_scale)
    };
}

fn apply_input(camera: &mut Camera, input: &InputSnapshot, config: &CameraConfig) {
    if input.zoom_reset_pressed() {
        camera.target_scale = clamp_scale(camera, camera.default_scale);
    }
    let steps = input.zoom_delta_steps();
    if steps != 0 {
        camera.target_scale = clamp_scale(camera, camera.target_scale + steps as f32 * config.zoom_step);
    }

    if input.is_down(InputAction::RotateCameraLeft) {
        camera.rotation -= CAMERA_ROTATION_STEP;
    }
    if input.is_down(InputAction::RotateCameraRight) {
        camera.rotation += CAMERA_ROTATION_STEP;
    }
    camera.rotation = normalize_rotation(camera.rotation);
}

fn ease_scale(camera: &mut Camera, lerp: f32) {
    if lerp <= 0.0 {
        camera.scale = camera.target_scale;
        return;
    }
    camera.scale += (camera.target_scale - camera.scale) * lerp.min(1.0);
    if (camera.scale - camera.target_scale).abs() < ZOOM_SNAP_EPSILON {
        camera.scale = camera.target_scale;
    }
}

fn clamp_scale(camera: &Camera, scale: f32) -> f32 {
    if !scale.is_finite() {
        return camera.min_scale.max(camera.default_scale);
    }
    scale.clamp(camera.min_scale, camera.max_scale)
}

/// Wraps into `[0, 2pi)`.
pub fn normalize_rotation(rotation: f32) -> f32 {
    if !rotation.is_finite() {
        return 0.0;
    }
    let wrapped = rotation.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
