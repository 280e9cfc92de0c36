//! Snapshot type and the change-only differ.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event_key::EventKey;
use crate::flags::{DEFAULT_SUPPRESSED_FIELDS, STATUS_FLAG_FIELDS};

/// A full point-in-time status read.
///
/// `flags` is the raw bitflag word; `explicit` carries boolean fields that
/// some telemetry versions report outside the flag word (e.g. landing-gear
/// state). A `BTreeMap` keeps explicit-field emission order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Raw status flag word.
    #[serde(alias = "Flags")]
    pub flags: u64,

    /// Explicitly typed boolean fields, keyed by field name.
    #[serde(default, alias = "Explicit")]
    pub explicit: BTreeMap<String, bool>,
}

impl StatusSnapshot {
    /// Snapshot with only a flag word.
    pub fn from_flags(flags: u64) -> Self {
        StatusSnapshot {
            flags,
            explicit: BTreeMap::new(),
        }
    }

    /// True if the given mask is set in the flag word.
    pub fn is_set(&self, mask: u64) -> bool {
        self.flags & mask != 0
    }
}

/// Pure differ over successive snapshots.
///
/// Holds no snapshot state itself; see [`StatusChannel`] for the stateful
/// wrapper that owns the baseline.
#[derive(Debug, Clone)]
pub struct StatusDiffer {
    suppressed: HashSet<String>,
}

impl StatusDiffer {
    /// Differ with the default suppression list.
    pub fn new() -> Self {
        Self::with_suppressed(DEFAULT_SUPPRESSED_FIELDS.iter().copied())
    }

    /// Differ with a caller-chosen suppression list (field names,
    /// case-insensitive). The list is policy and changes release to release;
    /// keep it data.
    pub fn with_suppressed<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        StatusDiffer {
            suppressed: fields.into_iter().map(|f| f.to_ascii_lowercase()).collect(),
        }
    }

    fn is_suppressed(&self, field: &str) -> bool {
        self.suppressed.contains(&field.to_ascii_lowercase())
    }

    /// Emit one `Status.<Field>:<value>` key per boolean field whose value
    /// changed between `previous` and `current`.
    ///
    /// Emission order follows the fixed flag table, then the explicit fields
    /// in sorted-name order, never change-detection order. With no previous
    /// snapshot there is no baseline to diff against and the result is empty.
    pub fn diff(
        &self,
        previous: Option<&StatusSnapshot>,
        current: &StatusSnapshot,
    ) -> Vec<EventKey> {
        let Some(previous) = previous else {
            trace!("first status snapshot observed, baseline only");
            return Vec::new();
        };

        let mut emitted = Vec::new();

        for (mask, field) in STATUS_FLAG_FIELDS {
            let curr = current.is_set(*mask);
            let prev = previous.is_set(*mask);
            if curr != prev && !self.is_suppressed(field) {
                emitted.push(EventKey::status(field, curr));
            }
        }

        for (field, curr) in &current.explicit {
            let prev = previous.explicit.get(field).copied();
            if prev != Some(*curr) && prev.is_some() && !self.is_suppressed(field) {
                emitted.push(EventKey::status(field, *curr));
            }
        }

        if !emitted.is_empty() {
            trace!(changes = emitted.len(), "status snapshot diff");
        }
        emitted
    }
}

impl Default for StatusDiffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful wrapper owning the previous snapshot.
///
/// After each [`StatusChannel::advance`] the current snapshot becomes the new
/// baseline, changed or not. Only the most recent snapshot is retained.
#[derive(Debug, Default)]
pub struct StatusChannel {
    differ: StatusDiffer,
    previous: Option<StatusSnapshot>,
}

impl StatusChannel {
    /// Channel with the default suppression list.
    pub fn new() -> Self {
        StatusChannel {
            differ: StatusDiffer::new(),
            previous: None,
        }
    }

    /// Channel with a caller-chosen differ.
    pub fn with_differ(differ: StatusDiffer) -> Self {
        StatusChannel {
            differ,
            previous: None,
        }
    }

    /// Diff against the stored baseline and advance it.
    pub fn advance(&mut self, snapshot: StatusSnapshot) -> Vec<EventKey> {
        let emitted = self.differ.diff(self.previous.as_ref(), &snapshot);
        self.previous = Some(snapshot);
        emitted
    }

    /// The current baseline, if any snapshot has been observed.
    pub fn baseline(&self) -> Option<&StatusSnapshot> {
        self.previous.as_ref()
    }
}
