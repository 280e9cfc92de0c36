//! Error taxonomy for the EDHaptics dispatch engine.
//!
//! Two families: [`DeviceError`] for backend probing and transport failures,
//! and [`ConfigError`] for settings-file problems rejected before they reach
//! the dispatch core. Nothing in the dispatch path propagates a `DeviceError`
//! past the router; callers downgrade to a log record at the I/O call site.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod device;

pub use config::ConfigError;
pub use device::DeviceError;

/// Severity classification used when downgrading errors to log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational; expected in normal operation (e.g. device absent).
    Info,
    /// Degraded but recoverable; the next request gets a fresh attempt.
    Warning,
    /// Operation failed; the effect is lost but the process is unaffected.
    Error,
}

impl ErrorSeverity {
    /// True if this severity should surface above debug logging.
    pub fn is_loggable(self) -> bool {
        self >= ErrorSeverity::Warning
    }
}
