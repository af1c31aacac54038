//! Task queue adapter backed by the ambient tokio runtime.

use crate::task::{
    domain::TaskId,
    ports::{TaskJob, TaskQueue, TaskQueueError, TaskQueueResult},
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runs each submitted job as an independent tokio task.
///
/// Live jobs are tracked by identifier so they can be cancelled; a job
/// removes itself from the table when it finishes or is cancelled.
#[derive(Debug, Clone, Default)]
pub struct TokioTaskQueue {
    live: Arc<DashMap<TaskId, CancellationToken>>,
}

impl TokioTaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of jobs that have not finished yet.
    #[must_use]
    pub fn live_jobs(&self) -> usize {
        self.live.len()
    }
}

#[async_trait]
impl TaskQueue for TokioTaskQueue {
    async fn submit(&self, task_id: TaskId, job: TaskJob) -> TaskQueueResult<()> {
        let handle = tokio::runtime::Handle::try_current().map_err(TaskQueueError::unavailable)?;
        let token = CancellationToken::new();
        match self.live.entry(task_id) {
            Entry::Occupied(_) => return Err(TaskQueueError::AlreadyQueued(task_id)),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
            }
        }

        let live = Arc::clone(&self.live);
        handle.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    info!(%task_id, "task cancelled before completion");
                }
                () = job => {
                    debug!(%task_id, "task finished");
                }
            }
            live.remove(&task_id);
        });
        Ok(())
    }

    async fn cancel(&self, task_id: TaskId) -> TaskQueueResult<bool> {
        let Some((_, token)) = self.live.remove(&task_id) else {
            return Ok(false);
        };
        token.cancel();
        Ok(true)
    }
}
