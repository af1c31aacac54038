//! Task queue port.
//!
//! The queue only has to run submitted jobs and honour cancellation; job
//! outcomes are reported through the task status tracker, not the queue.

use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Unit of asynchronous work handed to a queue.
pub type TaskJob = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Result type for task queue operations.
pub type TaskQueueResult<T> = Result<T, TaskQueueError>;

/// Contract for executing background jobs.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueues `job` under `task_id` and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueueError::AlreadyQueued`] when a job with the same
    /// identifier is still running, or [`TaskQueueError::Unavailable`] when
    /// the queue cannot accept work.
    async fn submit(&self, task_id: TaskId, job: TaskJob) -> TaskQueueResult<()>;

    /// Requests cancellation of a queued or running job.
    ///
    /// Returns `true` when a live job was signalled.
    async fn cancel(&self, task_id: TaskId) -> TaskQueueResult<bool>;
}

/// Errors returned by task queue implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskQueueError {
    /// A job with the same identifier is still live.
    #[error("task {0} is already queued")]
    AlreadyQueued(TaskId),

    /// The queue cannot accept work.
    #[error("task queue unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskQueueError {
    /// Wraps an infrastructure error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
