//! In-memory repository for task status records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{TaskId, TaskRecord},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let mut records = self.state.write().map_err(lock_error)?;
        if records.contains_key(&record.id()) {
            return Err(TaskRepositoryError::DuplicateTask(record.id()));
        }
        records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let mut records = self.state.write().map_err(lock_error)?;
        let stored = records
            .get_mut(&record.id())
            .ok_or(TaskRepositoryError::NotFound(record.id()))?;
        if stored.status().is_terminal() {
            return Err(TaskRepositoryError::AlreadyTerminal(record.id()));
        }
        *stored = record.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskRecord>> {
        let records = self.state.read().map_err(lock_error)?;
        Ok(records.get(&id).cloned())
    }
}
