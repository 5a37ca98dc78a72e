//! Logging configuration for wmf-replica.
//!
//! Diagnostics (per-wiki timing lines, client debug output) go through
//! `tracing`; this module wires up a stderr subscriber for library
//! consumers that have not installed their own.

use tracing_subscriber::EnvFilter;

/// Initializes stderr logging.
///
/// Log level is controlled via `RUST_LOG`, defaulting to `info` so the
/// per-wiki timing diagnostics are visible. Safe to call more than once;
/// later calls are no-ops.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_stderr_logging();
        init_stderr_logging();
    }
}
