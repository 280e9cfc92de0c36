//! Command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use edhaptics_backends::probe::probe_slot;
use edhaptics_engine::{
    DeviceBinding, DispatchRouter, EffectMapper, EffectTarget, EventKey, RumbleScheduler,
    Settings, StatusChannel, StatusSnapshot,
};

/// Probe one slot or scan all four and report what answered.
pub fn probe(slot: Option<u8>) -> Result<()> {
    let slots: Vec<u8> = match slot {
        Some(s) => vec![s],
        None => (0..4).collect(),
    };
    let mut found = 0;
    for s in slots {
        match probe_slot(s) {
            Some(backend) => {
                println!("slot {s}: {}", backend.name());
                found += 1;
            }
            None => println!("slot {s}: no device"),
        }
    }
    if found == 0 {
        warn!("no rumble devices found");
    }
    Ok(())
}

/// Play a continuous hold, then a short pulse train, then stop.
pub async fn test_effect(slot: u8, left: f64, right: f64, duration_ms: i32, gain: f64) -> Result<()> {
    let Some(backend) = probe_slot(slot) else {
        bail!("no rumble device in slot {slot}");
    };
    println!("testing {} (slot {slot})", backend.name());
    let scheduler = RumbleScheduler::new(Arc::from(backend), gain);

    let hold = if duration_ms > 0 { duration_ms } else { 500 };
    scheduler.play_continuous(left, right, hold);
    tokio::time::sleep(Duration::from_millis(u64::from(hold.unsigned_abs()) + 200)).await;

    scheduler.play_pulsed(left, right, 100, 3);
    tokio::time::sleep(Duration::from_millis(800)).await;

    scheduler.stop_immediately();
    Ok(())
}

/// Run the dispatcher against decoded telemetry lines on stdin.
///
/// Each line is a JSON object: `{"Flags": <u64>, ...}` is treated as a
/// status snapshot, `{"event": "<name>"}` as a one-shot event. Unparseable
/// lines are logged and skipped. EOF stops every device and exits.
pub async fn run(settings_path: &Path) -> Result<()> {
    let settings = Settings::from_path(settings_path)
        .with_context(|| format!("loading {}", settings_path.display()))?;

    let mapper = EffectMapper::with_overrides(
        settings
            .force_file_rumble
            .iter()
            .map(|(k, v)| (k.as_str(), *v)),
    );
    let mut router = DispatchRouter::new(mapper, StatusChannel::new());

    for device in &settings.devices {
        let name = device.display_name();
        if !device.xinput {
            // File-effect rendering needs a platform force-feedback driver
            // behind the FileEffectDevice port; none ships with this binary.
            warn!(device = %name, "file-effect device configured but no driver is available, skipping");
            continue;
        }
        // Validation already bounds user_index to -1..=3.
        let backend = match u8::try_from(device.user_index) {
            Ok(slot) => probe_slot(slot),
            Err(_) => (0..4).find_map(probe_slot),
        };
        match backend {
            Some(backend) => {
                info!(device = %name, backend = backend.name(), "device bound");
                let scheduler = RumbleScheduler::new(Arc::from(backend), device.rumble_gain);
                router.add_device(
                    DeviceBinding::new(name, EffectTarget::Motor(scheduler))
                        .with_events(device.status_events.iter().cloned()),
                );
            }
            None => warn!(device = %name, "no rumble device answered the probe, skipping"),
        }
    }
    if router.device_count() == 0 {
        bail!("no devices bound; nothing to dispatch to");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) if value.get("Flags").is_some() || value.get("flags").is_some() => {
                match serde_json::from_value::<StatusSnapshot>(value) {
                    Ok(snapshot) => router.on_status(snapshot),
                    Err(e) => warn!(error = %e, "bad status snapshot line"),
                }
            }
            Ok(value) => match value.get("event").and_then(|v| v.as_str()) {
                Some(event) => router.on_event(&EventKey::new(event)),
                None => warn!("line is neither a snapshot nor an event, skipping"),
            },
            Err(e) => warn!(error = %e, "unparseable line, skipping"),
        }
    }

    router.stop_all();
    Ok(())
}
