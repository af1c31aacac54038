//! Repository port for task status persistence.

use crate::task::domain::{TaskId, TaskRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task status persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, record: &TaskRecord) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing record.
    ///
    /// Implementations must refuse to overwrite a record whose stored status
    /// is already terminal, so concurrent writers cannot both complete it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the record does not
    /// exist and [`TaskRepositoryError::AlreadyTerminal`] when the stored
    /// record is terminal.
    async fn update(&self, record: &TaskRecord) -> TaskRepositoryResult<()>;

    /// Finds a record by task identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskRecord>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The record was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored record is terminal and cannot be overwritten.
    #[error("task {0} is already in a terminal status")]
    AlreadyTerminal(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
