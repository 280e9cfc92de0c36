//! Per-device rumble scheduling with generation-token arbitration.
//!
//! A device renders one waveform at a time, but events arrive faster than
//! effects finish. The policy is *newest request wins*: claiming a new
//! generation instantly strips every in-flight worker of its right to touch
//! the motors, and each worker re-checks the generation immediately before
//! every write, not just at start, so a worker that slept through a
//! supersession never clobbers the newer request's motor state. No
//! cancellable timers, no queue, no resumption: cancel, don't resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use edhaptics_backends::RumbleBackend;

/// Default hold when a request carries no usable duration.
pub const DEFAULT_EFFECT_MS: u32 = 250;

/// Hard cap on any single continuous hold. No software fault may leave a
/// motor running longer than this.
pub const HARD_CAP: Duration = Duration::from_secs(5 * 60);

/// Fixed off-time between pulses of a pulse train.
pub const INTER_PULSE_GAP: Duration = Duration::from_millis(100);

/// The in-flight effect, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleSession {
    /// Generation token this session was claimed under.
    pub generation: u64,
    /// Left motor level after gain, in `[0, 1]`.
    pub left: f64,
    /// Right motor level after gain, in `[0, 1]`.
    pub right: f64,
    /// When the session would end if not superseded.
    pub until: Instant,
}

/// Owns the single in-flight-effect slot of one device.
///
/// Cheap to clone; clones share the generation counter and session slot, so
/// a clone handed to a worker arbitrates against its source.
#[derive(Clone)]
pub struct RumbleScheduler {
    backend: Arc<dyn RumbleBackend>,
    generation: Arc<AtomicU64>,
    session: Arc<Mutex<Option<RumbleSession>>>,
    gain: f64,
}

impl RumbleScheduler {
    /// Scheduler over a probed backend with an intensity gain in `[0, 1]`.
    pub fn new(backend: Arc<dyn RumbleBackend>, gain: f64) -> Self {
        RumbleScheduler {
            backend,
            generation: Arc::new(AtomicU64::new(0)),
            session: Arc::new(Mutex::new(None)),
            gain: gain.clamp(0.0, 1.0),
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// The in-flight session, if any.
    pub fn session(&self) -> Option<RumbleSession> {
        *self.session.lock()
    }

    /// Hold `(left, right)` for `duration_ms`, then stop, unless a newer
    /// request claims the device first, in which case the stop is a no-op.
    ///
    /// Returns immediately; the hold runs on a background worker. Must be
    /// called from within a Tokio runtime.
    pub fn play_continuous(&self, left: f64, right: f64, duration_ms: i32) {
        let generation = self.claim();
        let hold = effective_hold(duration_ms);
        let (wire_left, wire_right) = (self.scale(left), self.scale(right));
        self.store_session(generation, left, right, hold);
        trace!(
            backend = self.backend.name(),
            generation,
            hold_ms = hold.as_millis() as u64,
            "continuous effect claimed"
        );

        let worker = self.clone();
        tokio::spawn(async move {
            if !worker.is_current(generation) {
                return;
            }
            worker.write_or_log(wire_left, wire_right);
            sleep(hold).await;
            if worker.is_current(generation) {
                worker.write_or_log(0, 0);
            }
            worker.clear_session(generation);
        });
    }

    /// Pulse `(left, right)` on for `pulse_width_ms`, off for the fixed gap,
    /// `pulse_count` times. The generation is re-checked before every single
    /// write, so a supersession mid-train stops further writes promptly.
    pub fn play_pulsed(&self, left: f64, right: f64, pulse_width_ms: i32, pulse_count: u32) {
        let generation = self.claim();
        let width = effective_hold(pulse_width_ms);
        let (wire_left, wire_right) = (self.scale(left), self.scale(right));
        let total = (width + INTER_PULSE_GAP) * pulse_count;
        self.store_session(generation, left, right, total);
        trace!(
            backend = self.backend.name(),
            generation,
            pulse_count,
            width_ms = width.as_millis() as u64,
            "pulse train claimed"
        );

        let worker = self.clone();
        tokio::spawn(async move {
            for _ in 0..pulse_count {
                if !worker.is_current(generation) {
                    break;
                }
                worker.write_or_log(wire_left, wire_right);
                sleep(width).await;
                if !worker.is_current(generation) {
                    break;
                }
                worker.write_or_log(0, 0);
                sleep(INTER_PULSE_GAP).await;
            }
            worker.clear_session(generation);
        });
    }

    /// Invalidate everything in flight and stop the motors now.
    ///
    /// Synchronous: used for the manual emergency stop and at teardown.
    /// Idempotent: a second call observes the same quiet motors.
    pub fn stop_immediately(&self) {
        let generation = self.claim();
        debug!(backend = self.backend.name(), generation, "immediate stop");
        self.write_or_log(0, 0);
        *self.session.lock() = None;
    }

    fn claim(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn scale(&self, level: f64) -> u16 {
        let scaled = level.clamp(0.0, 1.0) * self.gain * f64::from(u16::MAX);
        scaled.round() as u16
    }

    fn store_session(&self, generation: u64, left: f64, right: f64, hold: Duration) {
        *self.session.lock() = Some(RumbleSession {
            generation,
            left,
            right,
            until: Instant::now() + hold,
        });
    }

    /// Clear the session slot if it still belongs to `generation`. Runs even
    /// after a failed stop write, so the in-memory model always reaches idle.
    fn clear_session(&self, generation: u64) {
        let mut session = self.session.lock();
        if session.map(|s| s.generation) == Some(generation) {
            *session = None;
        }
    }

    /// Failures here must never escape the worker: a haptic glitch is a log
    /// line, not a crash.
    fn write_or_log(&self, left: u16, right: u16) {
        if let Err(e) = self.backend.set_vibration(left, right) {
            warn!(
                backend = self.backend.name(),
                error = %e,
                severity = ?e.severity(),
                "vibration write failed; effect abandoned"
            );
        }
    }
}

impl std::fmt::Debug for RumbleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumbleScheduler")
            .field("backend", &self.backend.name())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("gain", &self.gain)
            .finish()
    }
}

/// Non-positive durations mean "default" for motor devices; everything is
/// bounded by the hard cap.
fn effective_hold(duration_ms: i32) -> Duration {
    let ms = if duration_ms > 0 {
        u64::from(duration_ms.unsigned_abs())
    } else {
        u64::from(DEFAULT_EFFECT_MS)
    };
    Duration::from_millis(ms).min(HARD_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edhaptics_backends::mock::MockRumbleBackend;

    fn scheduler(gain: f64) -> (RumbleScheduler, MockRumbleBackend) {
        let mock = MockRumbleBackend::new("mock");
        (RumbleScheduler::new(Arc::new(mock.clone()), gain), mock)
    }

    /// With the clock paused, sleeping past every pending timer lets all
    /// workers run to completion deterministically.
    async fn settle() {
        sleep(Duration::from_secs(600)).await;
    }

    #[test]
    fn test_effective_hold_coercion_and_cap() {
        assert_eq!(effective_hold(0), Duration::from_millis(250));
        assert_eq!(effective_hold(-10), Duration::from_millis(250));
        assert_eq!(effective_hold(1000), Duration::from_secs(1));
        assert_eq!(effective_hold(i32::MAX), HARD_CAP);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_writes_on_then_off() {
        let (scheduler, mock) = scheduler(1.0);
        scheduler.play_continuous(1.0, 0.5, 400);
        settle().await;
        assert_eq!(mock.writes(), vec![(u16::MAX, 0x8000), (0, 0)]);
        assert!(scheduler.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gain_scales_wire_values() {
        let (scheduler, mock) = scheduler(0.5);
        scheduler.play_continuous(1.0, 1.0, 100);
        settle().await;
        let first = mock.writes()[0];
        assert_eq!(first.0, (f64::from(u16::MAX) * 0.5).round() as u16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_immediately_is_idempotent() {
        let (scheduler, mock) = scheduler(1.0);
        scheduler.play_continuous(1.0, 1.0, 10_000);
        scheduler.stop_immediately();
        let after_first = mock.last_write();
        scheduler.stop_immediately();
        settle().await;
        assert_eq!(after_first, Some((0, 0)));
        assert_eq!(mock.last_write(), Some((0, 0)));
        assert!(scheduler.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_still_reaches_idle() {
        let (scheduler, mock) = scheduler(1.0);
        mock.fail_next_writes(true);
        scheduler.play_continuous(1.0, 1.0, 100);
        settle().await;
        // No successful writes, but the session state is idle regardless.
        assert!(mock.writes().is_empty());
        assert!(scheduler.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_observable_while_active() {
        let (scheduler, _mock) = scheduler(1.0);
        scheduler.play_continuous(0.7, 0.7, 1000);
        let session = scheduler.session();
        assert!(session.is_some());
        assert_eq!(session.map(|s| s.generation), Some(1));
        settle().await;
        assert!(scheduler.session().is_none());
    }
}
