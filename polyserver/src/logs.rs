//! Logging bootstrap.
//!
//! One fmt subscriber for the whole process. The `RUST_LOG` environment
//! variable takes precedence; without it the configured minimum level
//! applies, defaulting to `info`.

use polyconfig::get_config;
use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    let default_level = get_config().get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}
