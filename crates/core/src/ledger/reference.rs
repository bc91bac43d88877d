//! Display references for journal entries (`JE-000123`).
//!
//! Numbers come from an atomic sequence, never from reading the highest
//! existing reference and incrementing it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Human-readable journal entry reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryReference(String);

impl EntryReference {
    /// Wraps an already formatted reference (e.g. loaded from storage).
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the numeric part, if the reference uses `prefix`.
    #[must_use]
    pub fn number(&self, prefix: &str) -> Option<u64> {
        self.0.strip_prefix(prefix)?.parse().ok()
    }
}

impl fmt::Display for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prefix and zero-padding of references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFormat {
    /// Text before the number.
    pub prefix: String,
    /// Minimum digits of the number.
    pub width: usize,
}

impl ReferenceFormat {
    /// Formats `number` as a reference.
    #[must_use]
    pub fn format(&self, number: u64) -> EntryReference {
        EntryReference(format!("{}{:0width$}", self.prefix, number, width = self.width))
    }
}

impl Default for ReferenceFormat {
    fn default() -> Self {
        Self {
            prefix: "JE-".to_string(),
            width: 6,
        }
    }
}

/// Monotonic, race-free reference counter.
#[derive(Debug)]
pub struct ReferenceSequence {
    next: AtomicU64,
}

impl ReferenceSequence {
    /// Sequence whose first value is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_after(0)
    }

    /// Sequence whose first value is `last + 1`.
    #[must_use]
    pub const fn starting_after(last: u64) -> Self {
        Self {
            next: AtomicU64::new(last + 1),
        }
    }

    /// Takes the next number. Every caller receives a distinct value.
    pub fn next_value(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the value the next call to `next_value` will hand out.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for ReferenceSequence {
    fn default() -> Self {
        Self::new()
    }
}
