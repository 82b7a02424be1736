//! Tracing/logging initialization.
//!
//! JSON logs by default; `LOG_FORMAT=pretty` switches to human-readable output
//! for local runs. Filtering comes from `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("pretty"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = if pretty {
        builder.with_target(true).try_init()
    } else {
        builder.json().with_target(false).try_init()
    };
}
