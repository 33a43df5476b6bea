//! Tracing subscriber setup for composition roots and tests

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber; respects `RUST_LOG`,
/// defaulting to `info`. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
