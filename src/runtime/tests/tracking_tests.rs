//! Tests for the runtime tracking read and write paths.

use super::support::{Runtime, runtime};
use crate::package::domain::PackageId;
use crate::runtime::{
    adapters::fs::FsRuntimeLogStore,
    domain::{AttemptId, Element, ElementValue, LearnerId, RuntimeLogEntry},
    ports::{
        ActiveLog, ElementRepository, RuntimeCache, RuntimeLogStore, RuntimeLogStoreResult,
    },
    services::{RuntimeTrackingError, RuntimeTrackingService},
};
use async_trait::async_trait;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Log store that holds its first read open until released.
struct HeldReadLog {
    inner: Arc<FsRuntimeLogStore>,
    read_taken: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl HeldReadLog {
    fn new(
        inner: Arc<FsRuntimeLogStore>,
        read_taken: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            inner,
            read_taken: Mutex::new(Some(read_taken)),
            release: Mutex::new(Some(release)),
        }
    }
}

#[async_trait]
impl RuntimeLogStore for HeldReadLog {
    async fn append(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        entry: RuntimeLogEntry,
    ) -> RuntimeLogStoreResult<()> {
        self.inner.append(learner_id, attempt_id, entry).await
    }

    async fn read_entries(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<Vec<RuntimeLogEntry>> {
        let entries = self.inner.read_entries(learner_id, attempt_id).await?;
        let taken = { self.read_taken.lock().expect("read lock").take() };
        if let Some(tx) = taken {
            tx.send(()).expect("test still waiting");
            let release = { self.release.lock().expect("release lock").take() };
            if let Some(rx) = release {
                rx.await.expect("release signal");
            }
        }
        Ok(entries)
    }

    async fn archive(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<()> {
        self.inner.archive(learner_id, attempt_id).await
    }

    async fn archive_consumed(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        consumed: usize,
    ) -> RuntimeLogStoreResult<()> {
        self.inner
            .archive_consumed(learner_id, attempt_id, consumed)
            .await
    }

    async fn list_active(&self) -> RuntimeLogStoreResult<Vec<ActiveLog>> {
        self.inner.list_active().await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_attempt_requires_a_known_package(runtime: Runtime) -> eyre::Result<()> {
    let tracking = runtime.tracking();
    let missing = PackageId::new();

    let result = tracking.start_attempt(LearnerId::new(), missing).await;
    ensure!(matches!(result, Err(RuntimeTrackingError::PackageNotFound(id)) if id == missing));

    let package_id = runtime.stored_package().await;
    let learner_id = LearnerId::new();
    let attempt = tracking.start_attempt(learner_id, package_id).await?;
    let found = tracking.get_attempt(attempt.id()).await?;
    ensure!(found.learner_id() == learner_id);
    ensure!(!found.is_complete());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_attempt_lookup_fails(runtime: Runtime) {
    let missing = AttemptId::new();
    let result = runtime.tracking().get_attempt(missing).await;
    assert!(matches!(result, Err(RuntimeTrackingError::AttemptNotFound(id)) if id == missing));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_value_logs_before_caching(runtime: Runtime) -> eyre::Result<()> {
    let tracking = runtime.tracking();
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();

    tracking
        .set_value(learner_id, attempt_id, "cmi.core.lesson_status", "incomplete")
        .await?;

    let logged = runtime.log.read_entries(learner_id, attempt_id).await?;
    ensure!(logged.len() == 1);
    let cached = runtime
        .cache
        .get(learner_id, attempt_id, "cmi.core.lesson_status")
        .await;
    ensure!(cached.as_deref() == Some("incomplete"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reads_survive_cache_loss(runtime: Runtime) -> eyre::Result<()> {
    let tracking = runtime.tracking();
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    tracking
        .set_value(learner_id, attempt_id, "cmi.suspend_data", "first")
        .await?;
    tracking
        .set_value(learner_id, attempt_id, "cmi.suspend_data", "second")
        .await?;

    runtime.cache.clear().await;
    ensure!(runtime.cache.is_empty());

    let value = tracking
        .get_value(learner_id, attempt_id, "cmi.suspend_data")
        .await?;
    ensure!(value == ElementValue::Set("second".to_owned()));
    ensure!(
        runtime
            .cache
            .get(learner_id, attempt_id, "cmi.suspend_data")
            .await
            .as_deref()
            == Some("second"),
        "a log hit repopulates the cache"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reads_fall_back_to_consolidated_elements(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    runtime
        .progress
        .upsert_all(&[Element {
            attempt_id,
            element_id: "cmi.core.score.raw".to_owned(),
            value: "75".to_owned(),
            updated_at: chrono::Utc::now(),
        }])
        .await?;

    let value = runtime
        .tracking()
        .get_value(learner_id, attempt_id, "cmi.core.score.raw")
        .await?;
    ensure!(value == ElementValue::Set("75".to_owned()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unwritten_elements_are_not_set(runtime: Runtime) -> eyre::Result<()> {
    let value = runtime
        .tracking()
        .get_value(LearnerId::new(), AttemptId::new(), "cmi.core.lesson_location")
        .await?;
    ensure!(value == ElementValue::NotSet);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_attempts_are_rejected(runtime: Runtime) -> eyre::Result<()> {
    let tracking = runtime.tracking();
    let package_id = runtime.stored_package().await;
    let owner = LearnerId::new();
    let intruder = LearnerId::new();
    let attempt = tracking.start_attempt(owner, package_id).await?;

    let write = tracking
        .set_value(intruder, attempt.id(), "cmi.suspend_data", "x")
        .await;
    ensure!(matches!(write, Err(RuntimeTrackingError::OwnerMismatch { .. })));
    let read = tracking
        .get_value(intruder, attempt.id(), "cmi.suspend_data")
        .await;
    ensure!(matches!(read, Err(RuntimeTrackingError::OwnerMismatch { .. })));
    ensure!(runtime.log.read_entries(intruder, attempt.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_fill_keeps_a_newer_concurrent_write(runtime: Runtime) -> eyre::Result<()> {
    let writer = runtime.tracking();
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    writer
        .set_value(learner_id, attempt_id, "cmi.core.lesson_location", "a")
        .await?;
    runtime.cache.clear().await;

    let (taken_tx, taken_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let reader = RuntimeTrackingService::new(
        Arc::new(HeldReadLog::new(Arc::clone(&runtime.log), taken_tx, release_rx)),
        Arc::clone(&runtime.cache),
        Arc::clone(&runtime.progress),
        Arc::clone(&runtime.packages),
        Arc::new(DefaultClock),
    );
    let in_flight = tokio::spawn(async move {
        reader
            .get_value(learner_id, attempt_id, "cmi.core.lesson_location")
            .await
    });

    taken_rx.await?;
    writer
        .set_value(learner_id, attempt_id, "cmi.core.lesson_location", "b")
        .await?;
    release_tx
        .send(())
        .map_err(|()| eyre::eyre!("reader finished early"))?;

    let stale = in_flight.await??;
    ensure!(stale == ElementValue::Set("a".to_owned()));
    let current = writer
        .get_value(learner_id, attempt_id, "cmi.core.lesson_location")
        .await?;
    ensure!(
        current == ElementValue::Set("b".to_owned()),
        "the read fill must not replace the newer write"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_if_absent_keeps_existing_entries(runtime: Runtime) {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    runtime.cache.set(learner_id, attempt_id, "cmi.suspend_data", "new").await;
    runtime
        .cache
        .set_if_absent(learner_id, attempt_id, "cmi.suspend_data", "old")
        .await;
    runtime
        .cache
        .set_if_absent(learner_id, attempt_id, "cmi.core.exit", "suspend")
        .await;

    assert_eq!(
        runtime.cache.get(learner_id, attempt_id, "cmi.suspend_data").await.as_deref(),
        Some("new")
    );
    assert_eq!(
        runtime.cache.get(learner_id, attempt_id, "cmi.core.exit").await.as_deref(),
        Some("suspend")
    );
}
