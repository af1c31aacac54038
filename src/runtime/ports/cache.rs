//! Runtime cache port.

use crate::runtime::domain::{AttemptId, LearnerId};
use async_trait::async_trait;

/// Best-effort accelerator keyed by `(learner, attempt, element)`.
///
/// Never authoritative: any entry may vanish at any time and readers fall
/// back to the log, so the methods are infallible.
#[async_trait]
pub trait RuntimeCache: Send + Sync {
    /// Returns the cached value, if any.
    async fn get(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
    ) -> Option<String>;

    /// Caches a value without expiry.
    async fn set(&self, learner_id: LearnerId, attempt_id: AttemptId, element_id: &str, value: &str);

    /// Caches a value only when no entry exists for the key.
    ///
    /// Read paths fill through this so a concurrent writer's newer value wins.
    async fn set_if_absent(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
        value: &str,
    );

    /// Drops one cached value.
    async fn evict(&self, learner_id: LearnerId, attempt_id: AttemptId, element_id: &str);

    /// Drops every cached value.
    async fn clear(&self);
}
