//! Priority-ordered backend probe.
//!
//! Selection policy: try the preferred platform SDK first, then the raw HID
//! channel, then the legacy SDK; the first candidate that reports connected
//! wins. The result is owned by the caller's device binding; there is no
//! process-global cache, so two slots probed in the same process stay
//! independent.

use tracing::{debug, info};

use crate::RumbleBackend;

/// A probe candidate: given a logical slot index, produce a backend or
/// nothing. Must be side-effect-free on the `None` path.
pub type BackendFactory = fn(u8) -> Option<Box<dyn RumbleBackend>>;

fn probe_hid(slot: u8) -> Option<Box<dyn RumbleBackend>> {
    crate::hid::RawHidBackend::probe(slot).map(|b| Box::new(b) as Box<dyn RumbleBackend>)
}

#[cfg(windows)]
fn probe_gaming_input(slot: u8) -> Option<Box<dyn RumbleBackend>> {
    crate::gaming_input::GamingInputBackend::probe(slot)
        .map(|b| Box::new(b) as Box<dyn RumbleBackend>)
}

#[cfg(windows)]
fn probe_xinput(slot: u8) -> Option<Box<dyn RumbleBackend>> {
    crate::xinput::XInputBackend::probe(slot).map(|b| Box::new(b) as Box<dyn RumbleBackend>)
}

#[cfg(windows)]
const DEFAULT_CHAIN: &[BackendFactory] = &[probe_gaming_input, probe_hid, probe_xinput];

#[cfg(not(windows))]
const DEFAULT_CHAIN: &[BackendFactory] = &[probe_hid];

/// Probe the default chain for a logical slot.
///
/// `None` means no family has a connected device at that index; the slot is
/// omitted from dispatch, not retried.
pub fn probe_slot(slot: u8) -> Option<Box<dyn RumbleBackend>> {
    probe_slot_with(slot, DEFAULT_CHAIN)
}

/// Probe an explicit candidate chain; first healthy backend wins.
pub fn probe_slot_with(slot: u8, chain: &[BackendFactory]) -> Option<Box<dyn RumbleBackend>> {
    for factory in chain {
        match factory(slot) {
            Some(backend) if backend.is_connected() => {
                info!(slot, backend = backend.name(), "rumble backend selected");
                return Some(backend);
            }
            Some(backend) => {
                debug!(slot, backend = backend.name(), "candidate probed but not connected");
            }
            None => {}
        }
    }
    debug!(slot, "no rumble backend available");
    None
}
