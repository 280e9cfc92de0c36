//! Legacy fallback backend: XInput.
//!
//! Last in the probe chain. XInput caps out at four user indices and grabs
//! the pad through the old API, but it works everywhere and needs no
//! drivers beyond the inbox ones.

use tracing::{debug, warn};
use windows::Win32::UI::Input::XboxController::{
    XINPUT_STATE, XINPUT_VIBRATION, XInputGetState, XInputSetState,
};

use crate::RumbleBackend;
use edhaptics_errors::DeviceError;

const ERROR_SUCCESS: u32 = 0;

/// Rumble through the legacy XInput API.
pub struct XInputBackend {
    user_index: u32,
    name: String,
}

impl XInputBackend {
    /// Try to bind XInput user index `slot` (0-3).
    pub fn probe(slot: u8) -> Option<XInputBackend> {
        if slot > 3 {
            return None;
        }
        let backend = XInputBackend {
            user_index: u32::from(slot),
            name: format!("XInput (slot {slot})"),
        };
        if !backend.is_connected() {
            return None;
        }
        debug!(slot, "XInput backend bound");
        Some(backend)
    }
}

impl RumbleBackend for XInputBackend {
    fn is_connected(&self) -> bool {
        let mut state = XINPUT_STATE::default();
        // SAFETY: `state` outlives the call and is a valid out pointer.
        unsafe { XInputGetState(self.user_index, &mut state) == ERROR_SUCCESS }
    }

    fn set_vibration(&self, left: u16, right: u16) -> Result<(), DeviceError> {
        let vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: left,
            wRightMotorSpeed: right,
        };
        // SAFETY: `vibration` outlives the call and is a valid in pointer.
        let rc = unsafe { XInputSetState(self.user_index, &vibration) };
        if rc == ERROR_SUCCESS {
            Ok(())
        } else {
            warn!(backend = self.name, rc, "XInput vibration write failed");
            Err(DeviceError::write_failed(&self.name, format!("XInputSetState rc={rc}")))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
