//! In-memory repository for attempts and consolidated elements.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::runtime::{
    domain::{Attempt, AttemptId, Element},
    ports::{
        AttemptRepository, ElementRepository, ProgressRepositoryError, ProgressRepositoryResult,
    },
};

#[derive(Debug, Default)]
struct InMemoryState {
    attempts: HashMap<AttemptId, Attempt>,
    elements: HashMap<AttemptId, BTreeMap<String, Element>>,
}

/// Thread-safe in-memory attempt and element repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryProgressRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ProgressRepositoryError {
    ProgressRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AttemptRepository for InMemoryProgressRepository {
    async fn store(&self, attempt: &Attempt) -> ProgressRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.attempts.contains_key(&attempt.id()) {
            return Err(ProgressRepositoryError::DuplicateAttempt(attempt.id()));
        }
        state.attempts.insert(attempt.id(), attempt.clone());
        Ok(())
    }

    async fn update(&self, attempt: &Attempt) -> ProgressRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .attempts
            .get_mut(&attempt.id())
            .ok_or(ProgressRepositoryError::AttemptNotFound(attempt.id()))?;
        *stored = attempt.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: AttemptId) -> ProgressRepositoryResult<Option<Attempt>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.attempts.get(&id).cloned())
    }
}

#[async_trait]
impl ElementRepository for InMemoryProgressRepository {
    async fn upsert_all(&self, elements: &[Element]) -> ProgressRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        for element in elements {
            state
                .elements
                .entry(element.attempt_id)
                .or_default()
                .insert(element.element_id.clone(), element.clone());
        }
        Ok(())
    }

    async fn find(
        &self,
        attempt_id: AttemptId,
        element_id: &str,
    ) -> ProgressRepositoryResult<Option<Element>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .elements
            .get(&attempt_id)
            .and_then(|elements| elements.get(element_id))
            .cloned())
    }

    async fn list_for_attempt(
        &self,
        attempt_id: AttemptId,
    ) -> ProgressRepositoryResult<Vec<Element>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .elements
            .get(&attempt_id)
            .map(|elements| elements.values().cloned().collect())
            .unwrap_or_default())
    }
}
