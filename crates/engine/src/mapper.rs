//! Force-identifier to motor-level mapping.
//!
//! Pure and table-driven. Resolution order:
//!
//! 1. (handled by the router) explicit per-event override, used as-is;
//! 2. configured override table keyed by normalized force identifier;
//!    levels from the table, requested duration kept;
//! 3. built-in substring table with tuned levels and a duration rule per
//!    entry: heavy effects get a floor (they must be felt fully), light
//!    pulses get a cap (they must not linger);
//! 4. default `(0.5, 0.5, max(requested, 250))`.

use std::collections::HashMap;

use crate::config::MotorLevels;

/// Default effect duration when a request carries none.
pub const DEFAULT_DURATION_MS: u32 = 250;

/// A resolved effect: motor levels in `[0, 1]` plus the effective duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedEffect {
    /// Left (low-frequency) motor level.
    pub left: f64,
    /// Right (high-frequency) motor level.
    pub right: f64,
    /// Effective duration in milliseconds.
    pub duration_ms: u32,
}

/// Duration shaping for built-in entries.
#[derive(Debug, Clone, Copy)]
enum DurationRule {
    /// `max(requested, n)`: strong effects play at least this long.
    Floor(u32),
    /// `min(requested, n)`: light pulses never outstay this.
    Cap(u32),
}

impl DurationRule {
    fn apply(self, requested_ms: u32) -> u32 {
        match self {
            DurationRule::Floor(n) => requested_ms.max(n),
            DurationRule::Cap(n) => requested_ms.min(n),
        }
    }
}

/// Ordered substring table; first match wins, so the more specific
/// `vibrateside` must precede `vibrate`.
const BUILTIN: &[(&str, f64, f64, DurationRule)] = &[
    ("dock", 0.85, 0.85, DurationRule::Floor(1500)),
    ("gear", 0.90, 0.90, DurationRule::Floor(2000)),
    ("hardpoint", 0.80, 0.80, DurationRule::Floor(1500)),
    ("landed", 0.75, 0.75, DurationRule::Floor(1200)),
    ("cargo", 0.70, 0.70, DurationRule::Floor(1500)),
    ("supercruise", 0.60, 0.60, DurationRule::Floor(1000)),
    ("vibrateside", 0.30, 0.70, DurationRule::Cap(500)),
    ("vibrate", 0.50, 0.50, DurationRule::Cap(300)),
    ("damper", 0.40, 0.40, DurationRule::Cap(400)),
    ("centerspring", 0.20, 0.20, DurationRule::Cap(200)),
];

/// Maps force identifiers to motor levels and effective durations.
#[derive(Debug, Clone, Default)]
pub struct EffectMapper {
    overrides: HashMap<String, MotorLevels>,
}

impl EffectMapper {
    /// Mapper with no configured overrides.
    pub fn new() -> Self {
        EffectMapper::default()
    }

    /// Mapper with a configured force-file override table. Keys are
    /// normalized once here so lookups stay allocation-light.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a str, MotorLevels)>,
    ) -> Self {
        EffectMapper {
            overrides: overrides
                .into_iter()
                .map(|(k, v)| (normalize(k), v))
                .collect(),
        }
    }

    /// Resolve a force identifier and requested duration.
    pub fn map(&self, force_identifier: &str, requested_ms: i32) -> MappedEffect {
        let requested = if requested_ms > 0 {
            requested_ms.unsigned_abs()
        } else {
            DEFAULT_DURATION_MS
        };
        let name = normalize(force_identifier);

        if let Some(levels) = self.overrides.get(&name) {
            return MappedEffect {
                left: levels.left,
                right: levels.right,
                duration_ms: requested,
            };
        }

        for (needle, left, right, rule) in BUILTIN {
            if name.contains(needle) {
                return MappedEffect {
                    left: *left,
                    right: *right,
                    duration_ms: rule.apply(requested),
                };
            }
        }

        MappedEffect {
            left: 0.5,
            right: 0.5,
            duration_ms: requested.max(DEFAULT_DURATION_MS),
        }
    }
}

/// Trim, lowercase, strip the `.ffe` suffix.
fn normalize(force_identifier: &str) -> String {
    let name = force_identifier.trim().to_ascii_lowercase();
    name.strip_suffix(".ffe").unwrap_or(&name).to_string()
}
