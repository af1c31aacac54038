//! Attempt aggregate root.

use super::{AttemptId, LearnerId, ScoreParseError};
use crate::package::domain::PackageId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

/// Clamps a score into `[0, 100]`.
#[must_use]
pub const fn clamp_score(raw: f64) -> f64 {
    raw.clamp(SCORE_MIN, SCORE_MAX)
}

/// One learner's tracked session against one package.
///
/// `is_complete` only ever moves from `false` to `true` here; reopening an
/// attempt is outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    id: AttemptId,
    learner_id: LearnerId,
    package_id: PackageId,
    completion_status: Option<String>,
    success_status: Option<String>,
    score: Option<f64>,
    is_complete: bool,
    last_processed: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAttemptData {
    /// Persisted attempt identifier.
    pub id: AttemptId,
    /// Owning learner.
    pub learner_id: LearnerId,
    /// Package the attempt runs against.
    pub package_id: PackageId,
    /// Last consolidated completion status.
    pub completion_status: Option<String>,
    /// Last consolidated success status.
    pub success_status: Option<String>,
    /// Last consolidated score; clamped on reconstruction.
    pub score: Option<f64>,
    /// Whether the attempt is complete.
    pub is_complete: bool,
    /// When the attempt was last consolidated.
    pub last_processed: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// Starts a new attempt.
    #[must_use]
    pub fn new(
        id: AttemptId,
        learner_id: LearnerId,
        package_id: PackageId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            learner_id,
            package_id,
            completion_status: None,
            success_status: None,
            score: None,
            is_complete: false,
            last_processed: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an attempt from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAttemptData) -> Self {
        Self {
            id: data.id,
            learner_id: data.learner_id,
            package_id: data.package_id,
            completion_status: data.completion_status,
            success_status: data.success_status,
            score: data.score.map(clamp_score),
            is_complete: data.is_complete,
            last_processed: data.last_processed,
            created_at: data.created_at,
        }
    }

    /// Parses a raw score value.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreParseError`] when the value is not a finite number.
    pub fn parse_score(raw: &str) -> Result<f64, ScoreParseError> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
            .ok_or_else(|| ScoreParseError(raw.to_owned()))
    }

    /// Returns the attempt identifier.
    #[must_use]
    pub const fn id(&self) -> AttemptId {
        self.id
    }

    /// Returns the owning learner.
    #[must_use]
    pub const fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    /// Returns the package the attempt runs against.
    #[must_use]
    pub const fn package_id(&self) -> PackageId {
        self.package_id
    }

    /// Returns the last consolidated completion status.
    #[must_use]
    pub fn completion_status(&self) -> Option<&str> {
        self.completion_status.as_deref()
    }

    /// Returns the last consolidated success status.
    #[must_use]
    pub fn success_status(&self) -> Option<&str> {
        self.success_status.as_deref()
    }

    /// Returns the score, always within `[0, 100]`.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        self.score
    }

    /// Returns `true` once the attempt has reached a finished status.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Returns when the attempt was last consolidated.
    #[must_use]
    pub const fn last_processed(&self) -> Option<DateTime<Utc>> {
        self.last_processed
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records a completion status; `finished` marks the attempt complete.
    pub fn record_completion_status(&mut self, status: impl Into<String>, finished: bool) {
        self.completion_status = Some(status.into());
        if finished {
            self.is_complete = true;
        }
    }

    /// Records a success status.
    pub fn record_success_status(&mut self, status: impl Into<String>) {
        self.success_status = Some(status.into());
    }

    /// Records a score, clamped into `[0, 100]`.
    pub const fn record_score(&mut self, score: f64) {
        self.score = Some(clamp_score(score));
    }

    /// Records that consolidation ran at `at`.
    pub const fn mark_processed(&mut self, at: DateTime<Utc>) {
        self.last_processed = Some(at);
    }
}
