//! EDHaptics dispatch engine.
//!
//! A single-direction reactive pipeline: decoded telemetry events flow in,
//! motor writes flow out.
//!
//! ```text
//! telemetry ─► status differ ─► router ─► mapper ─► rumble scheduler ─► backend
//! ```
//!
//! The engine owns no transport and no device protocol knowledge: telemetry
//! arrives pre-decoded, and effects leave through the narrow
//! `RumbleBackend` / [`FileEffectDevice`](ports::FileEffectDevice) seams.
//! Nothing on the dispatch path panics or propagates an error past the
//! router; the worst outcome of any fault is a missed or truncated effect.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod mapper;
pub mod ports;
pub mod router;
pub mod rumble;

pub use config::{DeviceConfig, EffectSpec, MotorLevels, Settings};
pub use mapper::{EffectMapper, MappedEffect};
pub use ports::FileEffectDevice;
pub use router::{DeviceBinding, DispatchRouter, EffectTarget};
pub use rumble::{RumbleScheduler, RumbleSession};

// The event vocabulary is shared with the status differ.
pub use edhaptics_status::{EventKey, StatusChannel, StatusDiffer, StatusSnapshot};
