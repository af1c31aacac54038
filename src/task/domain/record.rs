//! Task status aggregate root.

use super::{TaskDomainError, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of work a task record tracks, with the subject it operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Extraction and manifest processing of an uploaded package.
    PackageIngestion {
        /// Identifier of the package being ingested.
        package_id: Uuid,
    },
}

impl TaskKind {
    /// Returns the canonical storage representation of the kind tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PackageIngestion { .. } => "package_ingestion",
        }
    }
}

/// Durable record of an asynchronous task outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    kind: TaskKind,
    status: TaskStatus,
    result: Option<Value>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task kind.
    pub kind: TaskKind,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted result payload, if any.
    pub result: Option<Value>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted completion timestamp, if terminal.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Creates a pending task record.
    #[must_use]
    pub fn new(id: TaskId, kind: TaskKind, clock: &impl Clock) -> Self {
        Self {
            id,
            kind,
            status: TaskStatus::Pending,
            result: None,
            created_at: clock.utc(),
            completed_at: None,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            kind: data.kind,
            status: data.status,
            result: data.result,
            created_at: data.created_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the stored result payload, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the transition into a terminal status.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Records the task outcome, storing `payload` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the record is
    /// already terminal.
    pub fn complete(
        &mut self,
        success: bool,
        payload: Value,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let target = if success {
            TaskStatus::Success
        } else {
            TaskStatus::Failure
        };
        self.transition_to(target, clock)?;
        self.result = Some(payload);
        Ok(())
    }

    /// Marks the task as revoked by an external cancellation signal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the record is
    /// already terminal.
    pub fn mark_revoked(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::Revoked, clock)
    }

    fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.completed_at = Some(clock.utc());
        Ok(())
    }
}
