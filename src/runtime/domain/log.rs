//! Runtime log entries.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One learner write: an element and the value assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementWrite {
    /// Runtime data model element, e.g. `cmi.core.lesson_status`.
    pub element_id: String,
    /// Value as sent by the content.
    pub value: String,
}

/// Entry of an attempt's append-only log.
///
/// Ordering is the append order; `timestamp` is informational only and may
/// be skewed across writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeLogEntry {
    /// When the write was received.
    pub timestamp: DateTime<Utc>,
    /// The write itself.
    pub data: ElementWrite,
}

impl RuntimeLogEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(element_id: impl Into<String>, value: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            timestamp: clock.utc(),
            data: ElementWrite {
                element_id: element_id.into(),
                value: value.into(),
            },
        }
    }

    /// Returns the element written.
    #[must_use]
    pub fn element_id(&self) -> &str {
        &self.data.element_id
    }

    /// Returns the value written.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.data.value
    }
}
