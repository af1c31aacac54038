//! Runtime log store port.
//!
//! The log is the durable source of truth for an attempt until it has been
//! consolidated. Appends for one attempt are serialised; appends for
//! different attempts never wait on each other.

use crate::runtime::domain::{AttemptId, LearnerId, RuntimeLogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Result type for runtime log store operations.
pub type RuntimeLogStoreResult<T> = Result<T, RuntimeLogStoreError>;

/// An active log found by [`RuntimeLogStore::list_active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLog {
    /// Owning learner.
    pub learner_id: LearnerId,
    /// Attempt the log belongs to.
    pub attempt_id: AttemptId,
    /// Last modification time of the log.
    pub modified_at: DateTime<Utc>,
}

/// Append-only per-attempt log of element writes.
#[async_trait]
pub trait RuntimeLogStore: Send + Sync {
    /// Appends one entry to the attempt's log, creating the log if needed.
    ///
    /// The read-modify-write is atomic with respect to other appends to the
    /// same attempt.
    async fn append(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        entry: RuntimeLogEntry,
    ) -> RuntimeLogStoreResult<()>;

    /// Reads the full log in append order.
    ///
    /// A missing log reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeLogStoreError::Corrupted`] when the log exists but
    /// cannot be decoded.
    async fn read_entries(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<Vec<RuntimeLogEntry>>;

    /// Reads the full log, treating a corrupt or unreadable log as empty.
    async fn read_all(&self, learner_id: LearnerId, attempt_id: AttemptId) -> Vec<RuntimeLogEntry> {
        match self.read_entries(learner_id, attempt_id).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%learner_id, %attempt_id, error = %err, "runtime log unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Moves the whole log into the archive area, replacing any earlier
    /// archive for the attempt.
    async fn archive(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<()>;

    /// Archives the first `consumed` entries and keeps any later ones active.
    ///
    /// Archived entries are appended to any earlier archive for the attempt.
    ///
    /// Entries appended after a reader took its snapshot therefore survive
    /// the archive step.
    async fn archive_consumed(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        consumed: usize,
    ) -> RuntimeLogStoreResult<()>;

    /// Lists the logs currently in the active area.
    async fn list_active(&self) -> RuntimeLogStoreResult<Vec<ActiveLog>>;
}

/// Errors returned by runtime log stores.
#[derive(Debug, Clone, Error)]
pub enum RuntimeLogStoreError {
    /// The log exists but is not a valid entry sequence.
    #[error("runtime log for attempt {attempt_id} is corrupted: {reason}")]
    Corrupted {
        /// Owning learner.
        learner_id: LearnerId,
        /// Attempt whose log is corrupt.
        attempt_id: AttemptId,
        /// Decoder message.
        reason: String,
    },

    /// Storage failure.
    #[error("runtime log I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl RuntimeLogStoreError {
    /// Wraps a storage error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
