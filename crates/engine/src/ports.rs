//! File-effect device seam.
//!
//! Devices that render authored force files (wheel and stick class hardware)
//! sit behind [`FileEffectDevice`]; the router hands them the raw request and
//! the device library does the waveform work. This module also owns the
//! naming conventions around `.ffe` files: deriving a per-event file name
//! from an event key, and falling back to a base file when the event-specific
//! one was never authored.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use edhaptics_errors::DeviceError;
use edhaptics_status::EventKey;

/// A device that plays authored force-effect files.
///
/// Durations are passed through untouched: zero and below mean
/// play-until-stopped, which is meaningful for these devices.
pub trait FileEffectDevice: Send + Sync {
    /// Whether `force_file` (normalized, with extension) is loaded.
    fn has_effect(&self, force_file: &str) -> bool;

    /// Play a loaded force file.
    #[allow(clippy::too_many_arguments)]
    fn play_file_effect(
        &self,
        force_file: &str,
        duration_ms: i32,
        left: Option<f64>,
        right: Option<f64>,
        pulse: bool,
        pulse_count: u32,
    ) -> Result<(), DeviceError>;

    /// Stop every effect currently playing.
    fn stop_all_effects(&self);

    /// Stable name for logs.
    fn name(&self) -> &str;
}

/// Derive the per-event force file name from an event key:
/// `Status.Gear:True` becomes `Status_Gear_True.ffe`.
pub fn event_to_ffe_name(event: &EventKey) -> String {
    let trimmed = event.as_str().trim();
    if trimmed.is_empty() {
        return "Unknown.ffe".to_string();
    }
    let name: String = trimmed
        .chars()
        .map(|c| if c == ':' || c == '.' { '_' } else { c })
        .collect();
    if name.to_ascii_lowercase().ends_with(".ffe") {
        name
    } else {
        format!("{name}.ffe")
    }
}

/// Lowercase, trim, and ensure the `.ffe` extension.
pub fn normalize_ffe_name(force_file: &str) -> String {
    let key = force_file.trim().to_ascii_lowercase();
    if key.ends_with(".ffe") {
        key
    } else {
        format!("{key}.ffe")
    }
}

/// Resolve a requested force file against what the device actually has
/// loaded. Event-specific files are optional; when one is missing, a tuned
/// base file stands in, so every stock event makes the hardware move even on
/// a fresh install with only the base files present.
pub fn resolve_effect_name(device: &dyn FileEffectDevice, force_file: &str) -> String {
    let key = normalize_ffe_name(force_file);
    if device.has_effect(&key) {
        return key;
    }
    if let Some(fallback) = ffe_fallback(&key) {
        if device.has_effect(fallback) {
            debug!(
                device = device.name(),
                requested = %key,
                fallback,
                "force file not loaded, using fallback"
            );
            return fallback.to_string();
        }
    }
    key
}

/// Base-file stand-in for a normalized `.ffe` name.
///
/// Status-derived names come in `_true`/`_false` pairs that share a fallback,
/// so the match is on the stem with that suffix stripped.
pub fn ffe_fallback(normalized: &str) -> Option<&'static str> {
    let stem = normalized.strip_suffix(".ffe")?;
    let base = stem
        .strip_suffix("_true")
        .or_else(|| stem.strip_suffix("_false"))
        .unwrap_or(stem);
    let fallback = match base {
        "status_docked" | "docked" | "undocked" => "dock.ffe",
        "status_landed" | "status_hardpoints" => "hardpoints.ffe",
        "status_gear" => "gear.ffe",
        "status_supercruise" | "supercruiseentry" | "supercruiseexit" => "supercruise.ffe",
        "status_cargoscoop" => "cargo.ffe",
        "touchdown" | "liftoff" => "landed.ffe",
        "status_lowfuel" | "status_overheating" | "heatdamage" | "heatwarning" => {
            "vibrateside.ffe"
        }
        "status_shields"
        | "status_flightassist"
        | "status_winging"
        | "status_lights"
        | "status_silentrunning"
        | "status_scooping"
        | "status_srvhandbreak"
        | "status_srvturrent"
        | "status_srvnearship"
        | "status_srvdriveassist"
        | "status_masslocked"
        | "status_fsdcharging"
        | "status_fsdcooldown"
        | "fsdjump"
        | "startjump"
        | "shieldstate"
        | "cockpitbreached"
        | "launchfighter"
        | "dockfighter"
        | "approachsettlement"
        | "leavebody"
        | "approachbody"
        | "dockingrequested"
        | "dockinggranted"
        | "dockingdenied"
        | "dockingcancelled"
        | "dockingtimeout" => "vibrate.ffe",
        _ => return None,
    };
    Some(fallback)
}

/// One recorded `play_file_effect` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEffect {
    pub force_file: String,
    pub duration_ms: i32,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub pulse: bool,
    pub pulse_count: u32,
}

/// Test double that records every call instead of touching hardware.
#[derive(Clone, Default)]
pub struct MockFileEffectDevice {
    loaded: Arc<Mutex<HashSet<String>>>,
    played: Arc<Mutex<Vec<RecordedEffect>>>,
    stop_calls: Arc<Mutex<u32>>,
}

impl MockFileEffectDevice {
    pub fn new() -> Self {
        MockFileEffectDevice::default()
    }

    /// Mark a force file as loaded on the device.
    pub fn load(&self, force_file: &str) -> &Self {
        self.loaded.lock().insert(normalize_ffe_name(force_file));
        self
    }

    pub fn played(&self) -> Vec<RecordedEffect> {
        self.played.lock().clone()
    }

    pub fn stop_calls(&self) -> u32 {
        *self.stop_calls.lock()
    }
}

impl FileEffectDevice for MockFileEffectDevice {
    fn has_effect(&self, force_file: &str) -> bool {
        self.loaded.lock().contains(force_file)
    }

    fn play_file_effect(
        &self,
        force_file: &str,
        duration_ms: i32,
        left: Option<f64>,
        right: Option<f64>,
        pulse: bool,
        pulse_count: u32,
    ) -> Result<(), DeviceError> {
        self.played.lock().push(RecordedEffect {
            force_file: force_file.to_string(),
            duration_ms,
            left,
            right,
            pulse,
            pulse_count,
        });
        Ok(())
    }

    fn stop_all_effects(&self) {
        *self.stop_calls.lock() += 1;
    }

    fn name(&self) -> &str {
        "mock-ffb"
    }
}
