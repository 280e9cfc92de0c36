//! Mock rumble backend with a recorded write history.
//!
//! Shared between unit tests, the engine's integration tests, and anything
//! that wants to exercise dispatch without hardware.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::RumbleBackend;
use edhaptics_errors::DeviceError;

/// One recorded `set_vibration` call.
pub type MotorWrite = (u16, u16);

/// In-memory backend that records every write.
#[derive(Clone)]
pub struct MockRumbleBackend {
    name: String,
    writes: Arc<Mutex<Vec<MotorWrite>>>,
    connected: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MockRumbleBackend {
    /// Connected mock with an empty history.
    pub fn new(name: impl Into<String>) -> Self {
        MockRumbleBackend {
            name: name.into(),
            writes: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(AtomicBool::new(true)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Every write so far, in order.
    pub fn writes(&self) -> Vec<MotorWrite> {
        self.writes.lock().clone()
    }

    /// The most recent write, if any.
    pub fn last_write(&self) -> Option<MotorWrite> {
        self.writes.lock().last().copied()
    }

    /// Forget the history (keeps connection state).
    pub fn clear(&self) {
        self.writes.lock().clear();
    }

    /// Simulate the device going away.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }

    /// Make subsequent writes fail without disconnecting.
    pub fn fail_next_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl RumbleBackend for MockRumbleBackend {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn set_vibration(&self, left: u16, right: u16) -> Result<(), DeviceError> {
        if !self.is_connected() {
            return Err(DeviceError::disconnected(&self.name));
        }
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(DeviceError::write_failed(&self.name, "injected failure"));
        }
        self.writes.lock().push((left, right));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
