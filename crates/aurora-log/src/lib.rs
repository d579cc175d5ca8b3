//! Structured logging for the lighting engine binaries.
//!
//! Installs a `tracing` subscriber with console output (timestamps,
//! module paths, severity) and environment-based filtering. Library
//! crates log through the `log` facade; the subscriber's log bridge picks
//! those records up, so binaries only need to call [`init_logging`] once
//! at startup.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber.
///
/// `default_filter` is used when `RUST_LOG` is not set (e.g. `"info"` or
/// `"info,aurora_frame=debug"`). Calling this more than once is a no-op;
/// the first subscriber wins.
pub fn init_logging(default_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or("info")));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
