//! Consolidated element values.

use super::AttemptId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical value of one element within an attempt, unique per
/// `(attempt, element_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Owning attempt.
    pub attempt_id: AttemptId,
    /// Runtime data model element.
    pub element_id: String,
    /// Last value written.
    pub value: String,
    /// When the learner last wrote the value.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a runtime read.
///
/// An element nobody has written yet is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// The most recent value written.
    Set(String),
    /// No write exists for the element.
    NotSet,
}

impl ElementValue {
    /// Returns the value, if set.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Set(value) => Some(value.as_str()),
            Self::NotSet => None,
        }
    }

    /// Converts into an `Option`.
    #[must_use]
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Set(value) => Some(value),
            Self::NotSet => None,
        }
    }
}
