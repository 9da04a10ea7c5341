mod app;

use tracing::{error, info};

fn main() {
    app::init_tracing();
    info!("=== simcore startup ===");

    if let Err(err) = app::run() {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}
