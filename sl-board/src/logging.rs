//! Tracing subscriber setup.

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging: `RUST_LOG` if set, otherwise `info`.
///
/// Call once, at the top of `main`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Logging initialized");
}
