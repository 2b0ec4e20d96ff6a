//! Process-wide tracing/logging setup shared by every binary.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide tracing with the given output format.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(format);
}
