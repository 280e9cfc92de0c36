//! Event dispatch across configured devices.
//!
//! The router is the only component that sees the whole picture: it owns the
//! per-device event tables, the shared mapper, and the status channel. Each
//! incoming event is looked up independently per device, so one event can
//! drive a wheel and a pad at once. Unmapped events are skipped silently;
//! players map only what they care about and the rest is noise.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use edhaptics_status::{EventKey, StatusChannel, StatusSnapshot};

use crate::config::EffectSpec;
use crate::mapper::EffectMapper;
use crate::ports::{self, FileEffectDevice};
use crate::rumble::RumbleScheduler;

/// Where a device's effects land.
pub enum EffectTarget {
    /// Dual-motor rumble through a probed backend.
    Motor(RumbleScheduler),
    /// Authored force files on wheel/stick hardware.
    FileEffects(Arc<dyn FileEffectDevice>),
}

impl std::fmt::Debug for EffectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectTarget::Motor(s) => write!(f, "Motor({})", s.backend_name()),
            EffectTarget::FileEffects(d) => write!(f, "FileEffects({})", d.name()),
        }
    }
}

/// One configured device plus its event table.
#[derive(Debug)]
pub struct DeviceBinding {
    name: String,
    events: HashMap<EventKey, EffectSpec>,
    target: EffectTarget,
}

impl DeviceBinding {
    pub fn new(name: impl Into<String>, target: EffectTarget) -> Self {
        DeviceBinding {
            name: name.into(),
            events: HashMap::new(),
            target,
        }
    }

    /// Register the device's event table. Later entries for the same key
    /// replace earlier ones, matching how a settings file reads top to
    /// bottom.
    pub fn with_events(mut self, specs: impl IntoIterator<Item = EffectSpec>) -> Self {
        for spec in specs {
            self.events.insert(EventKey::new(spec.event.clone()), spec);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Fans events out to every bound device.
#[derive(Debug)]
pub struct DispatchRouter {
    devices: Vec<DeviceBinding>,
    mapper: EffectMapper,
    status: Mutex<StatusChannel>,
}

impl DispatchRouter {
    pub fn new(mapper: EffectMapper, status: StatusChannel) -> Self {
        DispatchRouter {
            devices: Vec::new(),
            mapper,
            status: Mutex::new(status),
        }
    }

    pub fn add_device(&mut self, binding: DeviceBinding) {
        self.devices.push(binding);
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Dispatch one logical event to every device that maps it.
    pub fn on_event(&self, event: &EventKey) {
        for device in &self.devices {
            let Some(spec) = device.events.get(event) else {
                continue;
            };
            trace!(device = %device.name, event = %event, force = %spec.force_file, "dispatching");
            match &device.target {
                EffectTarget::Motor(scheduler) => self.play_motor(scheduler, spec),
                EffectTarget::FileEffects(ffb) => play_file(ffb.as_ref(), spec),
            }
        }
    }

    /// Feed a raw status snapshot: diff against the previous one and
    /// dispatch the resulting state-change events in order. Duplicate
    /// snapshots produce no events, so re-reads of an unchanged status file
    /// are free.
    pub fn on_status(&self, snapshot: StatusSnapshot) {
        let events = self.status.lock().advance(snapshot);
        for event in &events {
            self.on_event(event);
        }
    }

    /// Quiet every device now. Safe to call repeatedly and at shutdown.
    pub fn stop_all(&self) {
        for device in &self.devices {
            match &device.target {
                EffectTarget::Motor(scheduler) => scheduler.stop_immediately(),
                EffectTarget::FileEffects(ffb) => ffb.stop_all_effects(),
            }
        }
    }

    /// Motor devices get resolved levels: the explicit per-event override
    /// when the entry carries one, otherwise the mapper's verdict on the
    /// force identifier.
    fn play_motor(&self, scheduler: &RumbleScheduler, spec: &EffectSpec) {
        let (left, right, duration_ms) = match spec.explicit_override() {
            Some(levels) => (levels.left, levels.right, spec.duration_ms),
            None => {
                let mapped = self.mapper.map(&spec.force_file, spec.duration_ms);
                let duration = i32::try_from(mapped.duration_ms).unwrap_or(i32::MAX);
                (mapped.left, mapped.right, duration)
            }
        };
        if spec.pulse && spec.pulse_count > 0 {
            scheduler.play_pulsed(left, right, duration_ms, spec.pulse_count);
        } else {
            scheduler.play_continuous(left, right, duration_ms);
        }
    }
}

/// File-effect devices get the request untouched apart from name
/// resolution; duration semantics (including play-until-stopped) are theirs.
fn play_file(device: &dyn FileEffectDevice, spec: &EffectSpec) {
    let resolved = ports::resolve_effect_name(device, &spec.force_file);
    if let Err(e) = device.play_file_effect(
        &resolved,
        spec.duration_ms,
        spec.left_motor,
        spec.right_motor,
        spec.pulse,
        spec.pulse_count,
    ) {
        warn!(
            device = device.name(),
            force = %resolved,
            error = %e,
            "file effect failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockFileEffectDevice;
    use edhaptics_backends::mock::MockRumbleBackend;

    fn router() -> DispatchRouter {
        DispatchRouter::new(EffectMapper::new(), StatusChannel::new())
    }

    #[test]
    fn test_unmapped_event_is_silently_skipped() {
        let ffb = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(ffb.clone())))
                .with_events([EffectSpec::new("Docked", "dock.ffe")]),
        );
        router.on_event(&EventKey::new("FSDJump"));
        assert!(ffb.played().is_empty());
    }

    #[test]
    fn test_event_lookup_is_case_insensitive() {
        let ffb = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(ffb.clone())))
                .with_events([EffectSpec::new("Status.Gear:True", "gear.ffe")]),
        );
        router.on_event(&EventKey::new("STATUS.GEAR:TRUE"));
        assert_eq!(ffb.played().len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let ffb = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(ffb.clone())))
                .with_events([
                    EffectSpec::new("Docked", "old.ffe"),
                    EffectSpec::new("docked", "new.ffe"),
                ]),
        );
        router.on_event(&EventKey::new("Docked"));
        let played = ffb.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].force_file, "new.ffe");
    }

    #[test]
    fn test_file_target_gets_raw_passthrough() {
        let ffb = MockFileEffectDevice::new();
        ffb.load("vibrate.ffe");
        let mut spec = EffectSpec::new("HullDamage", "vibrate");
        spec.duration_ms = -1;
        spec.left_motor = Some(0.9);
        spec.pulse = true;
        spec.pulse_count = 2;
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(ffb.clone())))
                .with_events([spec]),
        );
        router.on_event(&EventKey::new("HullDamage"));
        let played = ffb.played();
        assert_eq!(played[0].force_file, "vibrate.ffe");
        assert_eq!(played[0].duration_ms, -1);
        assert_eq!(played[0].left, Some(0.9));
        assert_eq!(played[0].right, None);
        assert!(played[0].pulse);
        assert_eq!(played[0].pulse_count, 2);
    }

    #[test]
    fn test_one_event_fans_out_to_all_devices() {
        let wheel = MockFileEffectDevice::new();
        let stick = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(wheel.clone())))
                .with_events([EffectSpec::new("Docked", "dock.ffe")]),
        );
        router.add_device(
            DeviceBinding::new("stick", EffectTarget::FileEffects(Arc::new(stick.clone())))
                .with_events([EffectSpec::new("Docked", "dock.ffe")]),
        );
        router.on_event(&EventKey::new("Docked"));
        assert_eq!(wheel.played().len(), 1);
        assert_eq!(stick.played().len(), 1);
    }

    #[test]
    fn test_stop_all_reaches_every_target() {
        let ffb = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(DeviceBinding::new(
            "wheel",
            EffectTarget::FileEffects(Arc::new(ffb.clone())),
        ));
        router.stop_all();
        router.stop_all();
        assert_eq!(ffb.stop_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_motor_target_uses_mapper_levels() {
        let mock = MockRumbleBackend::new("pad");
        let scheduler = RumbleScheduler::new(Arc::new(mock.clone()), 1.0);
        let mut router = router();
        router.add_device(
            DeviceBinding::new("pad", EffectTarget::Motor(scheduler))
                .with_events([EffectSpec::new("Status.Gear:True", "gear.ffe")]),
        );
        router.on_event(&EventKey::new("Status.Gear:True"));
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        let writes = mock.writes();
        assert_eq!(writes.len(), 2);
        // gear maps to 0.9 on both motors.
        let expected = (0.9_f64 * f64::from(u16::MAX)).round() as u16;
        assert_eq!(writes[0], (expected, expected));
        assert_eq!(writes[1], (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_motor_explicit_override_skips_mapper() {
        let mock = MockRumbleBackend::new("pad");
        let scheduler = RumbleScheduler::new(Arc::new(mock.clone()), 1.0);
        let mut spec = EffectSpec::new("HullDamage", "gear.ffe");
        spec.left_motor = Some(1.0);
        spec.right_motor = Some(0.0);
        spec.duration_ms = 100;
        let mut router = router();
        router.add_device(
            DeviceBinding::new("pad", EffectTarget::Motor(scheduler)).with_events([spec]),
        );
        router.on_event(&EventKey::new("HullDamage"));
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        assert_eq!(mock.writes()[0], (u16::MAX, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_snapshot_dedup() {
        let mock = MockFileEffectDevice::new();
        let mut router = router();
        router.add_device(
            DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(mock.clone())))
                .with_events([EffectSpec::new("Status.Gear:True", "gear.ffe")]),
        );
        router.on_status(StatusSnapshot::from_flags(0));
        router.on_status(StatusSnapshot::from_flags(1 << 2));
        router.on_status(StatusSnapshot::from_flags(1 << 2));
        assert_eq!(mock.played().len(), 1);
    }
}
