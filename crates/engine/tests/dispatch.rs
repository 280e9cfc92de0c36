//! End-to-end dispatch behavior over mock devices.
//!
//! All timing tests run on Tokio's paused clock: sleeping far past every
//! pending timer drives the background workers to completion
//! deterministically, so assertions on write sequences are exact.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use edhaptics_backends::mock::MockRumbleBackend;
use edhaptics_engine::ports::MockFileEffectDevice;
use edhaptics_engine::rumble::HARD_CAP;
use edhaptics_engine::{
    DeviceBinding, DispatchRouter, EffectMapper, EffectSpec, EffectTarget, EventKey,
    RumbleScheduler, Settings, StatusChannel, StatusSnapshot,
};

async fn settle() {
    sleep(Duration::from_secs(600)).await;
}

fn pad() -> (RumbleScheduler, MockRumbleBackend) {
    let mock = MockRumbleBackend::new("pad");
    (RumbleScheduler::new(Arc::new(mock.clone()), 1.0), mock)
}

#[tokio::test(start_paused = true)]
async fn test_newer_effect_supersedes_older() {
    let (scheduler, mock) = pad();
    scheduler.play_continuous(0.25, 0.25, 10_000);
    scheduler.play_continuous(1.0, 1.0, 100);
    settle().await;

    // The first request lost the device before its worker ran: only the
    // second request's on/off pair reaches the wire.
    assert_eq!(mock.writes(), vec![(u16::MAX, u16::MAX), (0, 0)]);
    assert!(scheduler.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_pulse_train_shape() {
    let (scheduler, mock) = pad();
    scheduler.play_pulsed(1.0, 1.0, 50, 3);
    settle().await;

    let writes = mock.writes();
    assert_eq!(writes.len(), 6);
    for pair in writes.chunks(2) {
        assert_eq!(pair, [(u16::MAX, u16::MAX), (0, 0)]);
    }
    assert!(scheduler.session().is_none());

    // Nothing stirs after the train completes.
    settle().await;
    assert_eq!(mock.writes().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_supersession_mid_pulse_train() {
    let (scheduler, mock) = pad();
    scheduler.play_pulsed(0.25, 0.25, 100, 5);
    // Let the first pulse play out, then take over mid-gap.
    sleep(Duration::from_millis(150)).await;
    scheduler.play_continuous(1.0, 1.0, 100);
    settle().await;

    let writes = mock.writes();
    let takeover = writes
        .iter()
        .position(|w| *w == (u16::MAX, u16::MAX))
        .unwrap();
    // No quarter-level write after the takeover.
    let quarter = (0.25 * f64::from(u16::MAX)).round() as u16;
    assert!(writes[takeover..].iter().all(|w| w.0 != quarter));
    // The takeover effect still ends with a stop.
    assert_eq!(writes.last(), Some(&(0, 0)));
    assert!(scheduler.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hard_cap_bounds_any_hold() {
    let (scheduler, mock) = pad();
    scheduler.play_continuous(1.0, 1.0, i32::MAX);
    sleep(HARD_CAP + Duration::from_secs(1)).await;

    assert_eq!(mock.writes(), vec![(u16::MAX, u16::MAX), (0, 0)]);
    assert!(scheduler.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_backend_never_wedges_dispatch() {
    let (scheduler, mock) = pad();
    mock.fail_next_writes(true);
    scheduler.play_continuous(1.0, 1.0, 100);
    settle().await;
    assert!(scheduler.session().is_none());

    // The backend recovers; the next effect plays normally.
    mock.fail_next_writes(false);
    scheduler.play_continuous(1.0, 1.0, 100);
    settle().await;
    assert_eq!(mock.writes(), vec![(u16::MAX, u16::MAX), (0, 0)]);
}

#[tokio::test(start_paused = true)]
async fn test_settings_to_motor_writes_end_to_end() {
    let settings: Settings = serde_json::from_str(
        r#"{
            "Devices": [
                {
                    "ProductName": "wheel",
                    "StatusEvents": [
                        { "Event": "Status.Gear:True", "ForceFile": "Status_Gear_True.ffe" }
                    ]
                },
                {
                    "XInput": true,
                    "UserIndex": 0,
                    "StatusEvents": [
                        { "Event": "Status.Gear:True", "ForceFile": "gear.ffe", "Duration": 500 }
                    ]
                }
            ],
            "ForceFileRumble": {
                "gear.ffe": { "Left": 0.25, "Right": 0.75 }
            }
        }"#,
    )
    .unwrap();
    settings.validate().unwrap();

    let mapper = EffectMapper::with_overrides(
        settings
            .force_file_rumble
            .iter()
            .map(|(k, v)| (k.as_str(), *v)),
    );
    let mut router = DispatchRouter::new(mapper, StatusChannel::new());

    let ffb = MockFileEffectDevice::new();
    ffb.load("gear.ffe");
    let (scheduler, pad_mock) = pad();
    router.add_device(
        DeviceBinding::new("wheel", EffectTarget::FileEffects(Arc::new(ffb.clone())))
            .with_events(settings.devices[0].status_events.clone()),
    );
    router.add_device(
        DeviceBinding::new("pad", EffectTarget::Motor(scheduler))
            .with_events(settings.devices[1].status_events.clone()),
    );

    // Baseline, gear down, then the same snapshot twice.
    router.on_status(StatusSnapshot::from_flags(0));
    router.on_status(StatusSnapshot::from_flags(1 << 2));
    router.on_status(StatusSnapshot::from_flags(1 << 2));
    settle().await;

    // Wheel: one effect, resolved through the fallback table since the
    // event-specific file is not loaded.
    let played = ffb.played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].force_file, "gear.ffe");

    // Pad: one continuous effect at the configured override levels.
    let writes = pad_mock.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].0, (0.25 * f64::from(u16::MAX)).round() as u16);
    assert_eq!(writes[0].1, (0.75 * f64::from(u16::MAX)).round() as u16);
    assert_eq!(writes[1], (0, 0));
}

#[tokio::test(start_paused = true)]
async fn test_stop_all_silences_everything() {
    let mut router = DispatchRouter::new(EffectMapper::new(), StatusChannel::new());
    let ffb = MockFileEffectDevice::new();
    let (scheduler, pad_mock) = pad();
    router.add_device(DeviceBinding::new(
        "wheel",
        EffectTarget::FileEffects(Arc::new(ffb.clone())),
    ));
    router.add_device(
        DeviceBinding::new("pad", EffectTarget::Motor(scheduler)).with_events([EffectSpec::new(
            "FSDJump",
            "vibrate.ffe",
        )]),
    );

    router.on_event(&EventKey::new("FSDJump"));
    router.stop_all();
    settle().await;

    assert_eq!(ffb.stop_calls(), 1);
    assert_eq!(pad_mock.last_write(), Some((0, 0)));
}
