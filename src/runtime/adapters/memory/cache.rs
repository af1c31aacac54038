//! Concurrent-map runtime cache.

use crate::runtime::{
    domain::{AttemptId, LearnerId},
    ports::RuntimeCache,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

type CacheKey = (LearnerId, AttemptId, String);

/// Process-local runtime cache without expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuntimeCache {
    entries: Arc<DashMap<CacheKey, String>>,
}

impl InMemoryRuntimeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RuntimeCache for InMemoryRuntimeCache {
    async fn get(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
    ) -> Option<String> {
        self.entries
            .get(&(learner_id, attempt_id, element_id.to_owned()))
            .map(|value| value.value().clone())
    }

    async fn set(&self, learner_id: LearnerId, attempt_id: AttemptId, element_id: &str, value: &str) {
        self.entries
            .insert((learner_id, attempt_id, element_id.to_owned()), value.to_owned());
    }

    async fn set_if_absent(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        element_id: &str,
        value: &str,
    ) {
        self.entries
            .entry((learner_id, attempt_id, element_id.to_owned()))
            .or_insert_with(|| value.to_owned());
    }

    async fn evict(&self, learner_id: LearnerId, attempt_id: AttemptId, element_id: &str) {
        self.entries
            .remove(&(learner_id, attempt_id, element_id.to_owned()));
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}
