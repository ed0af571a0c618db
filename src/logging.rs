//! Opt-in tracing initialization for binaries and tests.
//!
//! The library itself only emits `tracing` events; embedding applications
//! either install their own subscriber or call [`init`] to get env-filtered
//! stderr output (`RUST_LOG=mdrepo=debug`).

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    init_with_filter(EnvFilter::from_default_env());
}

/// Install a stderr subscriber with an explicit filter.
pub fn init_with_filter(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
