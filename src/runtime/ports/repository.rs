//! Repository ports for consolidated progress.

use crate::runtime::domain::{Attempt, AttemptId, Element};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for progress repository operations.
pub type ProgressRepositoryResult<T> = Result<T, ProgressRepositoryError>;

/// Attempt persistence contract.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Stores a new attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressRepositoryError::DuplicateAttempt`] when the
    /// identifier already exists.
    async fn store(&self, attempt: &Attempt) -> ProgressRepositoryResult<()>;

    /// Persists changes to an existing attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressRepositoryError::AttemptNotFound`] when the attempt
    /// does not exist.
    async fn update(&self, attempt: &Attempt) -> ProgressRepositoryResult<()>;

    /// Finds an attempt by identifier.
    async fn find_by_id(&self, id: AttemptId) -> ProgressRepositoryResult<Option<Attempt>>;
}

/// Element persistence contract, unique by `(attempt, element_id)`.
#[async_trait]
pub trait ElementRepository: Send + Sync {
    /// Inserts or replaces elements in one batch.
    async fn upsert_all(&self, elements: &[Element]) -> ProgressRepositoryResult<()>;

    /// Finds one element.
    async fn find(
        &self,
        attempt_id: AttemptId,
        element_id: &str,
    ) -> ProgressRepositoryResult<Option<Element>>;

    /// Lists every element of an attempt ordered by element identifier.
    async fn list_for_attempt(
        &self,
        attempt_id: AttemptId,
    ) -> ProgressRepositoryResult<Vec<Element>>;
}

/// Errors returned by progress repositories.
#[derive(Debug, Clone, Error)]
pub enum ProgressRepositoryError {
    /// An attempt with the same identifier already exists.
    #[error("duplicate attempt identifier: {0}")]
    DuplicateAttempt(AttemptId),

    /// The attempt was not found.
    #[error("attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProgressRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
