//! Settings-file error types.
//!
//! Malformed binding tables are rejected here, before the dispatch core ever
//! sees them; the core treats its configuration as immutable and valid.

use crate::ErrorSeverity;

/// Configuration surface errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file missing or unreadable.
    #[error("cannot read settings file {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON or fails the model shape.
    #[error("settings file {path} is malformed: {message}")]
    Malformed {
        /// Path that failed.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Settings parsed but contain no usable device entries.
    #[error("settings contain no devices")]
    NoDevices,

    /// A device entry is internally inconsistent.
    #[error("device '{device}' is invalid: {reason}")]
    InvalidDevice {
        /// Device name or identifier from the settings file.
        device: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Get the error severity. Configuration problems are always fatal to
    /// startup (the core never starts with a bad table), hence `Error`.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create a malformed-settings error.
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-device error.
    pub fn invalid_device(device: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidDevice {
            device: device.into(),
            reason: reason.into(),
        }
    }
}
