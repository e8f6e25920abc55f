//! Structured logging init, grounded in the pack's `ferrofluid` sub-crate
//! (the only in-pack dependency already on `tracing`).

use tracing_subscriber::EnvFilter;

/// Installs a process-wide `tracing` subscriber honoring `RUST_LOG`
/// (defaulting to `info` for this crate, `warn` elsewhere). Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyprcat=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
