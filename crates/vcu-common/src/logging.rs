//! Tracing setup shared by the client and server binaries.

use tracing_subscriber::EnvFilter;

/// Initialize a `tracing` subscriber writing to stdout.
///
/// `default_level` is used when `RUST_LOG` is unset; it accepts the same
/// syntax as `RUST_LOG` (e.g. `"vcu_client=debug,info"`).
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
