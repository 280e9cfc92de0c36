//! Rumble backend adapters.
//!
//! One narrow capability interface, [`RumbleBackend`], over a physical
//! vibration-capable device, with three interchangeable implementations
//! selected by a priority-ordered probe:
//!
//! 1. `Gaming.Input`: the platform gamepad SDK (Windows only, preferred);
//! 2. raw HID output reports: bypasses the gamepad SDKs entirely so the
//!    controller can be shared with a game that holds it through DirectInput;
//! 3. legacy XInput: the fallback SDK (Windows only).
//!
//! [`probe_slot`] runs the chain once per logical slot; the first backend
//! reporting connected wins and is owned by that slot's device binding for
//! the process lifetime. No backend at all is a normal outcome (the slot is
//! simply omitted), never an error.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod hid;
pub mod mock;
pub mod probe;
#[cfg(windows)]
pub mod gaming_input;
#[cfg(windows)]
pub mod xinput;

pub use probe::{probe_slot, probe_slot_with};

use edhaptics_errors::DeviceError;

/// Full-scale motor speed on the wire.
pub const MAX_MOTOR_SPEED: u16 = u16::MAX;

/// Uniform capability interface over one vibration-capable device.
///
/// `set_vibration` is called from background scheduler workers; it must be
/// safe to call concurrently, must never block beyond a bounded I/O timeout,
/// and its errors are logged by the caller rather than propagated; a haptic
/// glitch must never take down telemetry processing.
pub trait RumbleBackend: Send + Sync {
    /// Whether the device is still reachable.
    fn is_connected(&self) -> bool;

    /// Drive both motors; 0 is off, [`MAX_MOTOR_SPEED`] is full scale.
    fn set_vibration(&self, left: u16, right: u16) -> Result<(), DeviceError>;

    /// Human-readable backend identity for logs and diagnostics.
    fn name(&self) -> &str;
}
