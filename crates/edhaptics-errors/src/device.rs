//! Device and transport error types.
//!
//! A probe that finds nothing is *not* an error (it yields `None` at the
//! probe site); these variants cover the cases where a device that was
//! connected misbehaves, or where a transport write fails mid-session.

use crate::ErrorSeverity;

/// Backend and transport errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeviceError {
    /// Device disconnected mid-session.
    #[error("device disconnected: {0}")]
    Disconnected(String),

    /// A vibration write to a connected backend failed.
    #[error("write failed on {backend}: {message}")]
    WriteFailed {
        /// Backend name that rejected the write.
        backend: String,
        /// Transport-level message.
        message: String,
    },

    /// The underlying HID layer reported an error.
    #[error("HID error: {0}")]
    Hid(String),

    /// A write exceeded the bounded I/O timeout.
    #[error("{backend} timed out after {timeout_ms}ms")]
    Timeout {
        /// Backend name.
        backend: String,
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::Disconnected(_) => ErrorSeverity::Warning,
            DeviceError::WriteFailed { .. } => ErrorSeverity::Warning,
            DeviceError::Hid(_) => ErrorSeverity::Error,
            DeviceError::Timeout { .. } => ErrorSeverity::Warning,
        }
    }

    /// Check if this error means the device has gone away for good.
    pub fn is_device_gone(&self) -> bool {
        matches!(self, DeviceError::Disconnected(_))
    }

    /// Create a disconnected error.
    pub fn disconnected(backend: impl Into<String>) -> Self {
        DeviceError::Disconnected(backend.into())
    }

    /// Create a write-failed error.
    pub fn write_failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::WriteFailed {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(backend: impl Into<String>, timeout_ms: u64) -> Self {
        DeviceError::Timeout {
            backend: backend.into(),
            timeout_ms,
        }
    }
}
