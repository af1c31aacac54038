//! Tests for the filesystem runtime log store.

use super::support::{Runtime, runtime};
use crate::runtime::{
    domain::{AttemptId, LearnerId, RuntimeLogEntry},
    ports::{RuntimeLogStore, RuntimeLogStoreError},
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

fn entry(element_id: &str, value: &str) -> RuntimeLogEntry {
    RuntimeLogEntry::new(element_id, value, &DefaultClock)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn appends_preserve_order(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    for value in ["a", "b", "c"] {
        runtime
            .log
            .append(learner_id, attempt_id, entry("cmi.suspend_data", value))
            .await?;
    }

    let entries = runtime.log.read_entries(learner_id, attempt_id).await?;
    let values: Vec<&str> = entries.iter().map(RuntimeLogEntry::value).collect();
    ensure!(values == ["a", "b", "c"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_log_reads_as_empty(runtime: Runtime) -> eyre::Result<()> {
    let entries = runtime
        .log
        .read_entries(LearnerId::new(), AttemptId::new())
        .await?;
    ensure!(entries.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_appends_are_all_kept(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    let log = Arc::clone(&runtime.log);

    let handles: Vec<_> = (0..16)
        .map(|index| {
            let writer = Arc::clone(&log);
            tokio::spawn(async move {
                writer
                    .append(learner_id, attempt_id, entry(&format!("cmi.item.{index}"), "x"))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let entries = runtime.log.read_entries(learner_id, attempt_id).await?;
    ensure!(entries.len() == 16);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupt_log_is_reported_and_read_all_falls_back(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    let path = runtime.log_path(learner_id, attempt_id);
    std::fs::create_dir_all(path.parent().expect("log directory"))?;
    std::fs::write(&path, b"{not json")?;

    let result = runtime.log.read_entries(learner_id, attempt_id).await;
    ensure!(matches!(result, Err(RuntimeLogStoreError::Corrupted { .. })));
    ensure!(runtime.log.read_all(learner_id, attempt_id).await.is_empty());
    ensure!(path.is_file(), "reading must not touch a corrupt log");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_quarantines_a_corrupt_log(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    let path = runtime.log_path(learner_id, attempt_id);
    let dir = path.parent().expect("log directory").to_owned();
    std::fs::create_dir_all(&dir)?;
    std::fs::write(&path, b"[{\"broken\":")?;

    runtime
        .log
        .append(learner_id, attempt_id, entry("cmi.core.lesson_status", "incomplete"))
        .await?;

    let entries = runtime.log.read_entries(learner_id, attempt_id).await?;
    ensure!(entries.len() == 1);
    let quarantined = std::fs::read_dir(&dir)?
        .filter_map(Result::ok)
        .filter(|item| item.file_name().to_string_lossy().starts_with("progress.corrupt-"))
        .count();
    ensure!(quarantined == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archive_moves_the_whole_log(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    runtime
        .log
        .append(learner_id, attempt_id, entry("cmi.suspend_data", "state"))
        .await?;

    runtime.log.archive(learner_id, attempt_id).await?;

    ensure!(!runtime.log_path(learner_id, attempt_id).exists());
    let archived = std::fs::read(runtime.archive_path(learner_id, attempt_id))?;
    let entries: Vec<RuntimeLogEntry> = serde_json::from_slice(&archived)?;
    ensure!(entries.len() == 1);
    ensure!(runtime.log.list_active().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archive_consumed_keeps_the_unread_tail(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    for value in ["1", "2", "3"] {
        runtime
            .log
            .append(learner_id, attempt_id, entry("cmi.suspend_data", value))
            .await?;
    }

    runtime.log.archive_consumed(learner_id, attempt_id, 2).await?;
    runtime
        .log
        .append(learner_id, attempt_id, entry("cmi.suspend_data", "4"))
        .await?;
    runtime.log.archive_consumed(learner_id, attempt_id, 1).await?;

    let active = runtime.log.read_entries(learner_id, attempt_id).await?;
    let active_values: Vec<&str> = active.iter().map(RuntimeLogEntry::value).collect();
    ensure!(active_values == ["4"]);

    let archived: Vec<RuntimeLogEntry> =
        serde_json::from_slice(&std::fs::read(runtime.archive_path(learner_id, attempt_id))?)?;
    let archived_values: Vec<&str> = archived.iter().map(RuntimeLogEntry::value).collect();
    ensure!(archived_values == ["1", "2", "3"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_active_reports_each_attempt_log(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let first = AttemptId::new();
    let second = AttemptId::new();
    runtime.log.append(learner_id, first, entry("a", "1")).await?;
    runtime.log.append(learner_id, second, entry("b", "2")).await?;
    std::fs::create_dir_all(runtime.log_root.join("not-a-learner"))?;

    let logs = runtime.log.list_active().await?;
    ensure!(logs.len() == 2);
    ensure!(logs.iter().all(|log| log.learner_id == learner_id));
    ensure!(logs.iter().any(|log| log.attempt_id == first));
    ensure!(logs.iter().any(|log| log.attempt_id == second));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attempt_locks_are_released_after_use(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempts = [AttemptId::new(), AttemptId::new(), AttemptId::new()];
    let handles: Vec<_> = attempts
        .iter()
        .flat_map(|&attempt_id| (0..4).map(move |index| (attempt_id, index)))
        .map(|(attempt_id, index)| {
            let log = Arc::clone(&runtime.log);
            tokio::spawn(async move {
                log.append(learner_id, attempt_id, entry("cmi.suspend_data", &index.to_string()))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }
    for attempt_id in attempts {
        runtime.log.archive_consumed(learner_id, attempt_id, 2).await?;
        runtime.log.archive(learner_id, attempt_id).await?;
    }

    ensure!(runtime.log.lock_count() == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dropped_append_still_finishes_before_the_next(runtime: Runtime) -> eyre::Result<()> {
    let learner_id = LearnerId::new();
    let attempt_id = AttemptId::new();
    let abandoned = tokio::time::timeout(
        std::time::Duration::ZERO,
        runtime
            .log
            .append(learner_id, attempt_id, entry("cmi.core.lesson_location", "first")),
    )
    .await;
    if let Ok(result) = abandoned {
        result?;
    }
    runtime
        .log
        .append(learner_id, attempt_id, entry("cmi.core.lesson_location", "second"))
        .await?;

    let entries = runtime.log.read_entries(learner_id, attempt_id).await?;
    let values: Vec<&str> = entries.iter().map(RuntimeLogEntry::value).collect();
    ensure!(values == ["first", "second"]);
    Ok(())
}
