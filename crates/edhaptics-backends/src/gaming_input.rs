//! Preferred backend: the platform gamepad SDK (`Windows.Gaming.Input`).
//!
//! Vibration is a simple property write on the gamepad object; no report
//! layout knowledge, no exclusive acquisition. Requires Windows 10+.

use parking_lot::Mutex;
use tracing::{debug, warn};
use windows::Gaming::Input::{Gamepad, GamepadVibration};

use crate::RumbleBackend;
use edhaptics_errors::DeviceError;

/// Rumble through `Windows.Gaming.Input`.
pub struct GamingInputBackend {
    gamepad: Mutex<Gamepad>,
    name: String,
}

impl GamingInputBackend {
    /// Try to bind the `slot`-th gamepad the SDK reports.
    ///
    /// Any SDK failure (runtime missing, no gamepad at that index) is a
    /// normal absent-device outcome, not an error.
    pub fn probe(slot: u8) -> Option<GamingInputBackend> {
        let gamepads = match Gamepad::Gamepads() {
            Ok(gamepads) => gamepads,
            Err(e) => {
                debug!(error = %e, "Gaming.Input unavailable");
                return None;
            }
        };
        let gamepad = gamepads.GetAt(u32::from(slot)).ok()?;
        debug!(slot, "Gaming.Input backend bound");
        Some(GamingInputBackend {
            gamepad: Mutex::new(gamepad),
            name: format!("Gaming.Input (slot {slot})"),
        })
    }
}

impl RumbleBackend for GamingInputBackend {
    fn is_connected(&self) -> bool {
        // A gamepad object stays valid while plugged in; the SDK removes it
        // from the collection on unplug, after which writes fail and the
        // scheduler logs them.
        true
    }

    fn set_vibration(&self, left: u16, right: u16) -> Result<(), DeviceError> {
        let vibration = GamepadVibration {
            LeftMotor: f64::from(left) / f64::from(u16::MAX),
            RightMotor: f64::from(right) / f64::from(u16::MAX),
            LeftTrigger: 0.0,
            RightTrigger: 0.0,
        };
        self.gamepad
            .lock()
            .SetVibration(vibration)
            .map_err(|e| {
                warn!(backend = self.name, error = %e, "Gaming.Input vibration write failed");
                DeviceError::write_failed(&self.name, e.to_string())
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
