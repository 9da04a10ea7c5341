mod loop_runner;
mod metrics;
mod presenter;

pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use presenter::CLEAR_COLOR;
