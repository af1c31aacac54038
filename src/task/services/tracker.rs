//! Service layer for recording and querying task outcomes.

use crate::task::{
    domain::{TaskDomainError, TaskId, TaskKind, TaskRecord},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for task status operations.
#[derive(Debug, Error)]
pub enum TaskTrackerError {
    /// The requested transition is not allowed from the current status.
    #[error(transparent)]
    InvalidTransition(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
    /// No record exists for the identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

impl From<TaskRepositoryError> for TaskTrackerError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task tracker operations.
pub type TaskTrackerResult<T> = Result<T, TaskTrackerError>;

/// Durable task status tracker.
pub struct TaskStatusTracker<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskStatusTracker<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskStatusTracker<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new tracker.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a pending record for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackerError::Repository`] when the identifier is
    /// already in use or persistence fails.
    pub async fn create(&self, task_id: TaskId, kind: TaskKind) -> TaskTrackerResult<TaskRecord> {
        let record = TaskRecord::new(task_id, kind, &*self.clock);
        self.repository.store(&record).await?;
        debug!(%task_id, kind = kind.as_str(), "task record created");
        Ok(record)
    }

    /// Records a terminal outcome with its payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackerError::NotFound`] for unknown tasks and
    /// [`TaskTrackerError::InvalidTransition`] when the record is terminal.
    pub async fn complete(
        &self,
        task_id: TaskId,
        success: bool,
        payload: Value,
    ) -> TaskTrackerResult<TaskRecord> {
        let mut record = self.find_or_error(task_id).await?;
        record.complete(success, payload, &*self.clock)?;
        self.persist_terminal(&record).await?;
        info!(%task_id, status = record.status().as_str(), "task completed");
        Ok(record)
    }

    /// Marks a task as revoked in response to an external cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackerError::NotFound`] for unknown tasks and
    /// [`TaskTrackerError::InvalidTransition`] when the record is terminal.
    pub async fn mark_revoked(&self, task_id: TaskId) -> TaskTrackerResult<TaskRecord> {
        let mut record = self.find_or_error(task_id).await?;
        record.mark_revoked(&*self.clock)?;
        self.persist_terminal(&record).await?;
        info!(%task_id, "task revoked");
        Ok(record)
    }

    /// Returns the current record for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackerError::NotFound`] for unknown tasks.
    pub async fn query(&self, task_id: TaskId) -> TaskTrackerResult<TaskRecord> {
        self.find_or_error(task_id).await
    }

    async fn find_or_error(&self, task_id: TaskId) -> TaskTrackerResult<TaskRecord> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskTrackerError::NotFound(task_id))
    }

    /// Persists a freshly terminal record, turning a lost race against
    /// another writer into the same error a sequential caller would see.
    async fn persist_terminal(&self, record: &TaskRecord) -> TaskTrackerResult<()> {
        match self.repository.update(record).await {
            Ok(()) => Ok(()),
            Err(TaskRepositoryError::AlreadyTerminal(task_id)) => {
                let stored = self.find_or_error(task_id).await?;
                Err(TaskTrackerError::InvalidTransition(
                    TaskDomainError::InvalidTransition {
                        task_id,
                        from: stored.status(),
                        to: record.status(),
                    },
                ))
            }
            Err(other) => Err(other.into()),
        }
    }
}
