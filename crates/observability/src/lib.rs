//! Tracing and logging setup shared by watchdesk binaries.

pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat};

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
/// An unrecognised `WATCHDESK_LOG_FORMAT` falls back to JSON.
pub fn init() {
    let config = LogConfig::from_env().unwrap_or_default();
    crate::tracing::init(&config);
}
