//! Configuration surface.
//!
//! Mirrors the `settings.json` shape users already have (PascalCase keys,
//! `Pulse_Amount` with the underscore). Deserialized once at startup,
//! validated here, and treated as immutable by everything downstream.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use edhaptics_errors::ConfigError;

/// Top-level settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// One entry per physical target device.
    #[serde(alias = "Devices")]
    pub devices: Vec<DeviceConfig>,

    /// Optional per-force-file motor override, keyed by force file name
    /// (e.g. `"Dock.ffe"`). Applied when an event has no explicit override.
    #[serde(default, alias = "ForceFileRumble")]
    pub force_file_rumble: HashMap<String, MotorLevels>,
}

impl Settings {
    /// Load and validate a settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&text)
            .map_err(|e| ConfigError::malformed(path.display().to_string(), e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the dispatch core must never see.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        for device in &self.devices {
            if device.xinput {
                if !(-1..=3).contains(&device.user_index) {
                    return Err(ConfigError::invalid_device(
                        device.display_name(),
                        format!("UserIndex {} out of range -1..=3", device.user_index),
                    ));
                }
            } else if device.product_guid.is_none() && device.product_name.is_none() {
                return Err(ConfigError::invalid_device(
                    device.display_name(),
                    "needs ProductGuid or ProductName unless XInput is set",
                ));
            }
        }
        Ok(())
    }
}

/// A left/right motor level pair in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorLevels {
    /// Left (low-frequency) motor level.
    #[serde(default = "default_level", alias = "Left")]
    pub left: f64,
    /// Right (high-frequency) motor level.
    #[serde(default = "default_level", alias = "Right")]
    pub right: f64,
}

fn default_level() -> f64 {
    0.5
}

/// One physical target device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// DirectInput product GUID for file-effect devices.
    #[serde(default, alias = "ProductGuid")]
    pub product_guid: Option<String>,

    /// Product name fallback when the GUID is unknown.
    #[serde(default, alias = "ProductName")]
    pub product_name: Option<String>,

    /// Keep the centering spring running on file-effect devices.
    #[serde(default = "default_true", alias = "AutoCenter")]
    pub auto_center: bool,

    /// Force-feedback gain for file-effect devices (device units).
    #[serde(default = "default_ff_gain", alias = "ForceFeedbackGain")]
    pub force_feedback_gain: i32,

    /// Treat as a rumble pad (probed backend) instead of a file-effect device.
    #[serde(default, alias = "XInput")]
    pub xinput: bool,

    /// Rumble slot 0-3; -1 means auto-detect (first slot that probes).
    #[serde(default = "default_user_index", alias = "UserIndex")]
    pub user_index: i32,

    /// Rumble intensity gain in `[0, 1]`.
    #[serde(default = "default_gain", alias = "RumbleGain")]
    pub rumble_gain: f64,

    /// Event-to-effect table for this device.
    #[serde(default, alias = "StatusEvents")]
    pub status_events: Vec<EffectSpec>,
}

fn default_true() -> bool {
    true
}

fn default_ff_gain() -> i32 {
    10_000
}

fn default_user_index() -> i32 {
    -1
}

fn default_gain() -> f64 {
    1.0
}

impl DeviceConfig {
    /// A stable name for logs and error messages.
    pub fn display_name(&self) -> String {
        if self.xinput {
            format!("rumble pad (slot {})", self.user_index)
        } else {
            self.product_name
                .clone()
                .or_else(|| self.product_guid.clone())
                .unwrap_or_else(|| "unnamed device".to_string())
        }
    }
}

/// One event-to-effect mapping entry.
///
/// Owned by configuration; read-only at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    /// Event key this entry reacts to (case-insensitive).
    #[serde(alias = "Event")]
    pub event: String,

    /// Force identifier: the `.ffe` file for file-effect devices, the rumble
    /// pattern key for motor devices.
    #[serde(alias = "ForceFile")]
    pub force_file: String,

    /// Requested duration in ms. Non-positive means play-until-stopped for
    /// file-effect devices; motor devices coerce it to 250ms.
    #[serde(default = "default_duration", alias = "Duration")]
    pub duration_ms: i32,

    /// Explicit left-motor override in `[0, 1]`.
    #[serde(default, alias = "LeftMotor")]
    pub left_motor: Option<f64>,

    /// Explicit right-motor override in `[0, 1]`.
    #[serde(default, alias = "RightMotor")]
    pub right_motor: Option<f64>,

    /// Pulse the motors instead of one continuous hold.
    #[serde(default, alias = "Pulse")]
    pub pulse: bool,

    /// Number of pulses when `pulse` is set; each pulse lasts `duration_ms`.
    #[serde(default, alias = "Pulse_Amount", alias = "PulseAmount")]
    pub pulse_count: u32,
}

fn default_duration() -> i32 {
    250
}

impl EffectSpec {
    /// Minimal entry for tests and programmatic setup.
    pub fn new(event: impl Into<String>, force_file: impl Into<String>) -> Self {
        EffectSpec {
            event: event.into(),
            force_file: force_file.into(),
            duration_ms: default_duration(),
            left_motor: None,
            right_motor: None,
            pulse: false,
            pulse_count: 0,
        }
    }

    /// Explicit per-event motor override, if both sides are present.
    pub fn explicit_override(&self) -> Option<MotorLevels> {
        match (self.left_motor, self.right_motor) {
            (Some(left), Some(right)) => Some(MotorLevels { left, right }),
            _ => None,
        }
    }
}
