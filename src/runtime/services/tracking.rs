//! Learner-facing read and write paths.
//!
//! Writes are appended to the log before the cache is touched. Reads try
//! the cache, then the attempt's active log newest-first, then the
//! consolidated element store, so losing the cache never loses data.

use crate::package::{
    domain::PackageId,
    ports::{PackageRepository, PackageRepositoryError},
};
use crate::runtime::{
    domain::{Attempt, AttemptId, ElementValue, LearnerId, RuntimeLogEntry},
    ports::{
        AttemptRepository, ElementRepository, ProgressRepositoryError, RuntimeCache,
        RuntimeLogStore, RuntimeLogStoreError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by the runtime tracking service.
#[derive(Debug, Error)]
pub enum RuntimeTrackingError {
    /// The attempt belongs to another learner.
    #[error("attempt {attempt_id} does not belong to learner {learner_id}")]
    OwnerMismatch {
        /// Attempt addressed.
        attempt_id: AttemptId,
        /// Learner who addressed it.
        learner_id: LearnerId,
    },
    /// No attempt exists for the identifier.
    #[error("attempt {0} not found")]
    AttemptNotFound(AttemptId),
    /// No package exists for the identifier.
    #[error("package {0} not found")]
    PackageNotFound(PackageId),
    /// The runtime log could not be written or read.
    #[error(transparent)]
    Log(#[from] RuntimeLogStoreError),
    /// Attempt or element persistence failed.
    #[error(transparent)]
    Progress(#[from] ProgressRepositoryError),
    /// Package lookup failed.
    #[error(transparent)]
    Package(#[from] PackageRepositoryError),
}

/// Result type for runtime tracking operations.
pub type RuntimeTrackingResult<T> = Result<T, RuntimeTrackingError>;

/// Synchronous get/set surface over the log, cache and progress store.
pub struct RuntimeTrackingService<L, K, R, P, C>
where
    L: RuntimeLogStore,
    K: RuntimeCache,
    R: AttemptRepository + ElementRepository,
    P: PackageRepository,
    C: Clock + Send + Sync,
{
    log: Arc<L>,
    cache: Arc<K>,
    progress: Arc<R>,
    packages: Arc<P>,
    clock: Arc<C>,
}

impl<L, K, R, P, C> Clone for RuntimeTrackingService<L, K, R, P, C>
where
    L: RuntimeLogStore,
    K: RuntimeCache,
    R: AttemptRepository + ElementRepository,
    P: PackageRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            cache: Arc::clone(&self.cache),
            progress: Arc::clone(&self.progress),
            packages: Arc::clone(&self.packages),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L, K, R, P, C> RuntimeTrackingService<L, K, R, P, C>
where
    L: RuntimeLogStore,
    K: RuntimeCache,
    R: AttemptRepository + ElementRepository,
    P: PackageRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new tracking service.
    #[must_use]
    pub const fn new(
        log: Arc<L>,
        cache: Arc<K>,
        progress: Arc<R>,
        packages: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            log,
            cache,
            progress,
            packages,
            clock,
        }
    }

    /// Starts a new attempt for `learner_id` against an existing package.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeTrackingError::PackageNotFound`] for unknown
    /// packages or the persistence error that prevented storing.
    pub async fn start_attempt(
        &self,
        learner_id: LearnerId,
        package_id: PackageId,
    ) -> RuntimeTrackingResult<Attempt> {
        if self.packages.find_by_id(package_id).await?.is_none() {
            return Err(RuntimeTrackingError::PackageNotFound(package_id));
        }
        let attempt = Attempt::new(AttemptId::new(), learner_id, package_id, &*self.clock);
        self.progress.store(&attempt).await?;
        info!(%learner_id, %package_id, attempt_id = %attempt.id(), "attempt started");
        Ok(attempt)
    }

    /// Returns an attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeTrackingError::AttemptNotFound`] for unknown attempts.
    pub async fn get_attempt(&self, attempt_id: AttemptId) -> RuntimeTrackingResult<Attempt> {
        self.progress
            .find_by_id(attempt_id)
            .await?
            .ok_or(RuntimeTrackingError::AttemptNotFound(attempt_id))
    }

    /// Records a learner write.
    ///
    /// The entry is durable in the log before the cache sees it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeTrackingError::OwnerMismatch`] when a known attempt
    /// belongs to another learner, or the log error when the append fails.
    pub async fn set_value(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
        value: &str,
    ) -> RuntimeTrackingResult<()> {
        self.verify_owner(learner_id, attempt_id).await?;
        let entry = RuntimeLogEntry::new(element_id, value, &*self.clock);
        self.log.append(learner_id, attempt_id, entry).await?;
        self.cache.set(learner_id, attempt_id, element_id, value).await;
        debug!(%learner_id, %attempt_id, element_id, "element written");
        Ok(())
    }

    /// Returns the most recent value written for an element.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeTrackingError::OwnerMismatch`] when a known attempt
    /// belongs to another learner, or a persistence error from the element
    /// store.
    pub async fn get_value(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
    ) -> RuntimeTrackingResult<ElementValue> {
        self.verify_owner(learner_id, attempt_id).await?;

        if let Some(value) = self.cache.get(learner_id, attempt_id, element_id).await {
            debug!(%learner_id, %attempt_id, element_id, "cache hit");
            return Ok(ElementValue::Set(value));
        }
        debug!(%learner_id, %attempt_id, element_id, "cache miss");

        let entries = self.log.read_all(learner_id, attempt_id).await;
        let logged = entries
            .into_iter()
            .rev()
            .find(|entry| entry.element_id() == element_id)
            .map(|entry| entry.data.value);

        let found = if logged.is_some() {
            logged
        } else {
            self.progress
                .find(attempt_id, element_id)
                .await?
                .map(|element| element.value)
        };

        let Some(value) = found else {
            return Ok(ElementValue::NotSet);
        };
        self.cache
            .set_if_absent(learner_id, attempt_id, element_id, &value)
            .await;
        Ok(ElementValue::Set(value))
    }

    async fn verify_owner(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeTrackingResult<()> {
        match self.progress.find_by_id(attempt_id).await? {
            Some(attempt) if attempt.learner_id() != learner_id => {
                Err(RuntimeTrackingError::OwnerMismatch {
                    attempt_id,
                    learner_id,
                })
            }
            _ => Ok(()),
        }
    }
}
