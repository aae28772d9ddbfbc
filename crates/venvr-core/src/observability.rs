//! Observability: tracing init.
//!
//! Uses config::ObservabilityConfig for VENVR_QUIET, VENVR_LOG_LEVEL and
//! VENVR_LOG_JSON. Output goes to stderr; stdout is left to the CLI.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call once at process startup.
/// `RUST_LOG`, when set, takes precedence over the venvr variables.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = cfg.filter_directive();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}
