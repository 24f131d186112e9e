//! Package status events reported by trackers.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One status change for a package, as reported by a single tracker.
///
/// Timestamps are local to the provider and carry no zone information.
/// Derived equality compares raw fields and is only meaningful for events
/// from the same tracker. Use [`PackageEvent::is_same_as`] to compare events
/// across trackers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageEvent {
    /// When the status change happened.
    pub timestamp: NaiveDateTime,
    /// Provider-supplied description of the status change.
    pub description: String,
    /// Whether this event marks the package as delivered.
    pub is_delivery: bool,
}

impl PackageEvent {
    /// Creates a new event.
    pub fn new(
        timestamp: NaiveDateTime,
        description: impl Into<String>,
        is_delivery: bool,
    ) -> Self {
        Self {
            timestamp,
            description: description.into(),
            is_delivery,
        }
    }

    /// Returns true if both events describe the same real-world occurrence.
    ///
    /// Providers format the same occurrence differently, so the comparison is
    /// fuzzy: timestamps are compared at minute resolution and descriptions
    /// match when the shorter one (trimmed, upper-cased) is contained in the
    /// longer one. The delivery flag must agree exactly.
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.is_delivery == other.is_delivery
            && self.is_same_minute(other)
            && self.is_same_description(other)
    }

    fn is_same_minute(&self, other: &Self) -> bool {
        truncate_to_minute(self.timestamp) == truncate_to_minute(other.timestamp)
    }

    fn is_same_description(&self, other: &Self) -> bool {
        let a = self.description.trim().to_uppercase();
        let b = other.description.trim().to_uppercase();
        let (shorter, longer) = if a.len() < b.len() { (a, b) } else { (b, a) };
        longer.contains(&shorter)
    }
}

impl fmt::Display for PackageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.description
        )
    }
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    // Zero is always a valid second and nanosecond.
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}
