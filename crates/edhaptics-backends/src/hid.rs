//! Raw HID output-report rumble backend.
//!
//! Drives Xbox-compatible pads by writing rumble output reports directly,
//! bypassing the gamepad SDKs so the controller stays shareable with a game
//! that holds it through DirectInput. Slot N maps to the Nth matching device
//! in enumeration order.

use std::sync::atomic::{AtomicBool, Ordering};

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::RumbleBackend;
use edhaptics_errors::DeviceError;

/// Microsoft's USB vendor id.
const MICROSOFT_VID: u16 = 0x045E;

/// Product ids of Xbox-compatible pads known to accept rumble output reports.
const XBOX_PIDS: &[u16] = &[
    0x02D1, 0x02DD, 0x02EA, 0x02FD, 0x028E, 0x028F, 0x0B00, 0x0B05, 0x0B13, 0x0B20, 0x0B22,
];

/// Product ids that enumerate over Bluetooth and expect the report-id 0x03
/// rumble layout instead of the short wired layout.
const BLUETOOTH_PIDS: &[u16] = &[0x02FD, 0x0B05, 0x0B13, 0x0B20, 0x0B22];

/// Rumble over raw HID output reports.
pub struct RawHidBackend {
    device: Mutex<HidDevice>,
    use_report_id: bool,
    healthy: AtomicBool,
    name: String,
}

impl RawHidBackend {
    /// Try to bind the `slot`-th Xbox-compatible HID device (0-based).
    ///
    /// Returns `None` when enumeration fails, no matching device exists at
    /// that index, or the open fails; all normal absent-device outcomes.
    /// Leaves no handle behind on failure.
    pub fn probe(slot: u8) -> Option<RawHidBackend> {
        let api = match HidApi::new() {
            Ok(api) => api,
            Err(e) => {
                debug!(error = %e, "hidapi unavailable");
                return None;
            }
        };

        let info = api
            .device_list()
            .filter(|d| d.vendor_id() == MICROSOFT_VID && XBOX_PIDS.contains(&d.product_id()))
            .nth(usize::from(slot))?;

        let device = match info.open_device(&api) {
            Ok(device) => device,
            Err(e) => {
                debug!(slot, error = %e, "raw HID open failed");
                return None;
            }
        };

        let use_report_id = BLUETOOTH_PIDS.contains(&info.product_id());
        let name = format!("Raw HID (slot {slot}, pid {:04x})", info.product_id());
        debug!(slot, name, use_report_id, "raw HID backend bound");

        Some(RawHidBackend {
            device: Mutex::new(device),
            use_report_id,
            healthy: AtomicBool::new(true),
            name,
        })
    }

    fn build_report(&self, left: u8, right: u8) -> Vec<u8> {
        if self.use_report_id {
            // Bluetooth layout: report id 0x03, motor-enable mask 0x0F,
            // trigger motors unused, 100% magnitude scale, loop byte 0xEB.
            vec![
                0x03, 0x0F, 0x00, 0x00, 0x00, 0x00, left, right, 0xFF, 0x00, 0xEB,
            ]
        } else {
            // Wired layout: no report id, just the two motor bytes.
            vec![0x00, left, right]
        }
    }
}

impl RumbleBackend for RawHidBackend {
    fn is_connected(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    fn set_vibration(&self, left: u16, right: u16) -> Result<(), DeviceError> {
        // Wire scale for HID reports is a single byte per motor; the shift
        // keeps the high byte.
        let report = self.build_report((left >> 8) as u8, (right >> 8) as u8);
        match self.device.lock().write(&report) {
            Ok(_) => Ok(()),
            Err(e) => {
                // A failed write usually means the pad left; remember that so
                // the probe chain never re-picks this handle on a new binding.
                self.healthy.store(false, Ordering::Relaxed);
                warn!(backend = self.name, error = %e, "HID rumble write failed");
                Err(DeviceError::write_failed(&self.name, e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
