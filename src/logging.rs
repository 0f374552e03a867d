//! Tracing subscriber setup for binaries.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered at `level` unless `RUST_LOG` says
/// otherwise. Calling it twice is harmless.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
