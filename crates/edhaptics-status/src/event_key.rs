//! Normalized event key type shared by the status differ and the router.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A string identifier for a logical occurrence: either a one-shot journal
/// name (`"FSDJump"`) or a synthetic state-change key (`"Status.Gear:True"`).
///
/// Equality and hashing are ASCII case-insensitive, so settings files may
/// spell keys however they like. The original spelling is preserved for
/// display and logging. Immutable once constructed.
#[derive(Debug, Clone, Eq)]
pub struct EventKey(String);

impl EventKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        EventKey(key.into())
    }

    /// Create a synthetic state-change key: `Status.<field>:<True|False>`.
    pub fn status(field: &str, value: bool) -> Self {
        let value = if value { "True" } else { "False" };
        EventKey(format!("Status.{field}:{value}"))
    }

    /// The key as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventKey {
    fn from(key: &str) -> Self {
        EventKey::new(key)
    }
}

impl From<String> for EventKey {
    fn from(key: String) -> Self {
        EventKey(key)
    }
}
