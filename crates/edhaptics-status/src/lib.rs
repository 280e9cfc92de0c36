//! Status snapshot differencing.
//!
//! The game writes a full point-in-time status read (a bitflag word plus a
//! few explicitly typed scalars) at its own cadence. This crate turns
//! successive snapshots into *change-only* synthetic event keys of the form
//! `Status.<Field>:<True|False>`, suitable for the same dispatch table as
//! one-shot journal events.
//!
//! Two rules with teeth:
//!
//! - the very first snapshot observed is a baseline, never an event (cold
//!   start is silent);
//! - fields whose transitions are better sourced from a richer one-shot
//!   journal channel are suppressed here, so a single physical state change
//!   reported through both channels fires exactly once. The suppression list
//!   is data, not code; see [`StatusDiffer::with_suppressed`].

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod diff;
pub mod event_key;
pub mod flags;

pub use diff::{StatusChannel, StatusDiffer, StatusSnapshot};
pub use event_key::EventKey;
pub use flags::{DEFAULT_SUPPRESSED_FIELDS, STATUS_FLAG_FIELDS};
