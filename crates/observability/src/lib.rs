//! Process-wide tracing/logging setup.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize tracing with the default `info` level and the format chosen by
/// `SHELFWATCH_LOG_FORMAT` (`json` unless set to `pretty`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("SHELFWATCH_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    tracing::init(format, "info");
}
