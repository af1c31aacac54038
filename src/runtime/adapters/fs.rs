//! Runtime logs stored as one JSON array per attempt.
//!
//! Active logs live at `<log_root>/<learner>/<attempt>/progress.json`;
//! archived logs mirror that layout under a separate archive root. Writes
//! go to a temporary sibling first and are renamed into place, so readers
//! never observe a half-written log.

use crate::fs_utils::{
    SharedDir, open_existing_subdir, open_or_create_dir, open_or_create_subdir, read_if_exists,
    remove_file_if_exists, run_blocking, sorted_entries,
};
use crate::runtime::{
    domain::{AttemptId, LearnerId, RuntimeLogEntry},
    ports::{ActiveLog, RuntimeLogStore, RuntimeLogStoreError, RuntimeLogStoreResult},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

const LOG_FILE: &str = "progress.json";
const STAGING_FILE: &str = "progress.json.tmp";

type AttemptKey = (LearnerId, AttemptId);

/// Filesystem-backed runtime log store.
#[derive(Debug, Clone)]
pub struct FsRuntimeLogStore {
    active: SharedDir,
    archive: SharedDir,
    locks: Arc<DashMap<AttemptKey, Arc<Mutex<()>>>>,
}

impl FsRuntimeLogStore {
    /// Opens the active and archive roots, creating them if missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening either root.
    pub fn open(log_root: &Utf8Path, archive_root: &Utf8Path) -> io::Result<Self> {
        Ok(Self {
            active: Arc::new(open_or_create_dir(log_root)?),
            archive: Arc::new(open_or_create_dir(archive_root)?),
            locks: Arc::new(DashMap::new()),
        })
    }

    fn lock_for(&self, key: AttemptKey) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(key).or_default().value())
    }

    /// Runs `work` on the blocking pool while holding the attempt's lock.
    ///
    /// The guard travels with `work`, so the lock stays held until the write
    /// finishes even if the caller's future is dropped first.
    async fn with_attempt_lock<F>(&self, key: AttemptKey, work: F) -> RuntimeLogStoreResult<()>
    where
        F: FnOnce() -> RuntimeLogStoreResult<()> + Send + 'static,
    {
        let guard = self.lock_for(key).lock_owned().await;
        let result = run_blocking(
            move || {
                let outcome = work();
                drop(guard);
                outcome
            },
            RuntimeLogStoreError::io,
        )
        .await;
        self.release_lock(key);
        result
    }

    /// Drops the attempt's lock entry once nobody holds or awaits it.
    fn release_lock(&self, key: AttemptKey) {
        self.locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.len()
    }
}

fn attempt_dir(learner_id: LearnerId, attempt_id: AttemptId) -> String {
    format!("{learner_id}/{attempt_id}")
}

fn decode(
    learner_id: LearnerId,
    attempt_id: AttemptId,
    bytes: &[u8],
) -> RuntimeLogStoreResult<Vec<RuntimeLogEntry>> {
    serde_json::from_slice(bytes).map_err(|err| RuntimeLogStoreError::Corrupted {
        learner_id,
        attempt_id,
        reason: err.to_string(),
    })
}

fn write_entries(dir: &Dir, entries: &[RuntimeLogEntry]) -> RuntimeLogStoreResult<()> {
    let encoded = serde_json::to_vec_pretty(entries).map_err(RuntimeLogStoreError::io)?;
    dir.write(STAGING_FILE, encoded)
        .map_err(RuntimeLogStoreError::io)?;
    dir.rename(STAGING_FILE, dir, LOG_FILE)
        .map_err(RuntimeLogStoreError::io)
}

fn write_raw(dir: &Dir, bytes: &[u8]) -> RuntimeLogStoreResult<()> {
    dir.write(STAGING_FILE, bytes)
        .map_err(RuntimeLogStoreError::io)?;
    dir.rename(STAGING_FILE, dir, LOG_FILE)
        .map_err(RuntimeLogStoreError::io)
}

fn quarantine_name(at: DateTime<Utc>) -> String {
    format!("progress.corrupt-{}.json", at.format("%Y%m%dT%H%M%S%.6fZ"))
}

fn append_blocking(
    active: &Dir,
    learner_id: LearnerId,
    attempt_id: AttemptId,
    entry: RuntimeLogEntry,
) -> RuntimeLogStoreResult<()> {
    let dir = open_or_create_subdir(active, &attempt_dir(learner_id, attempt_id))
        .map_err(RuntimeLogStoreError::io)?;
    let mut entries = match read_if_exists(&dir, LOG_FILE).map_err(RuntimeLogStoreError::io)? {
        None => Vec::new(),
        Some(bytes) => match decode(learner_id, attempt_id, &bytes) {
            Ok(entries) => entries,
            Err(err) => {
                let quarantined = quarantine_name(entry.timestamp);
                dir.rename(LOG_FILE, &dir, &quarantined)
                    .map_err(RuntimeLogStoreError::io)?;
                warn!(
                    %learner_id,
                    %attempt_id,
                    quarantined = %quarantined,
                    error = %err,
                    "corrupt runtime log quarantined, starting a fresh log"
                );
                Vec::new()
            }
        },
    };
    entries.push(entry);
    write_entries(&dir, &entries)
}

fn archive_blocking(
    active: &Dir,
    archive: &Dir,
    learner_id: LearnerId,
    attempt_id: AttemptId,
    limit: Option<usize>,
) -> RuntimeLogStoreResult<()> {
    let relative = attempt_dir(learner_id, attempt_id);
    let Some(dir) = open_existing_subdir(active, &relative).map_err(RuntimeLogStoreError::io)?
    else {
        debug!(%learner_id, %attempt_id, "no active runtime log to archive");
        return Ok(());
    };
    let Some(bytes) = read_if_exists(&dir, LOG_FILE).map_err(RuntimeLogStoreError::io)? else {
        debug!(%learner_id, %attempt_id, "no active runtime log to archive");
        return Ok(());
    };
    let archive_dir =
        open_or_create_subdir(archive, &relative).map_err(RuntimeLogStoreError::io)?;

    let Some(consumed) = limit else {
        write_raw(&archive_dir, &bytes)?;
        remove_file_if_exists(&dir, LOG_FILE).map_err(RuntimeLogStoreError::io)?;
        info!(%learner_id, %attempt_id, "runtime log archived");
        return Ok(());
    };

    let mut entries = decode(learner_id, attempt_id, &bytes)?;
    let remainder = entries.split_off(consumed.min(entries.len()));
    let mut archived = match read_if_exists(&archive_dir, LOG_FILE)
        .map_err(RuntimeLogStoreError::io)?
    {
        None => Vec::new(),
        Some(previous) => decode(learner_id, attempt_id, &previous).unwrap_or_else(|err| {
            warn!(%learner_id, %attempt_id, error = %err, "archived log unreadable, replacing");
            Vec::new()
        }),
    };
    archived.extend(entries.iter().cloned());
    write_entries(&archive_dir, &archived)?;
    if remainder.is_empty() {
        remove_file_if_exists(&dir, LOG_FILE).map_err(RuntimeLogStoreError::io)?;
    } else {
        write_entries(&dir, &remainder)?;
    }
    info!(
        %learner_id,
        %attempt_id,
        archived = entries.len(),
        retained = remainder.len(),
        "runtime log archived"
    );
    Ok(())
}

fn list_blocking(active: &Dir) -> io::Result<Vec<ActiveLog>> {
    let mut logs = Vec::new();
    for (learner_name, is_dir) in sorted_entries(active)? {
        let Some(learner_id) = parse_id(&learner_name, is_dir).map(LearnerId::from_uuid) else {
            continue;
        };
        let learner_dir = active.open_dir(&learner_name)?;
        for (attempt_name, attempt_is_dir) in sorted_entries(&learner_dir)? {
            let Some(attempt_id) =
                parse_id(&attempt_name, attempt_is_dir).map(AttemptId::from_uuid)
            else {
                continue;
            };
            let attempt_handle = learner_dir.open_dir(&attempt_name)?;
            let metadata = match attempt_handle.metadata(LOG_FILE) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err),
            };
            let modified_at = DateTime::<Utc>::from(metadata.modified()?.into_std());
            logs.push(ActiveLog {
                learner_id,
                attempt_id,
                modified_at,
            });
        }
    }
    Ok(logs)
}

fn parse_id(name: &str, is_dir: bool) -> Option<Uuid> {
    if !is_dir {
        return None;
    }
    let parsed = Uuid::parse_str(name).ok();
    if parsed.is_none() {
        debug!(name, "ignoring non-attempt directory in log root");
    }
    parsed
}

#[async_trait]
impl RuntimeLogStore for FsRuntimeLogStore {
    async fn append(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        entry: RuntimeLogEntry,
    ) -> RuntimeLogStoreResult<()> {
        let active = Arc::clone(&self.active);
        self.with_attempt_lock((learner_id, attempt_id), move || {
            append_blocking(&active, learner_id, attempt_id, entry)
        })
        .await
    }

    async fn read_entries(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<Vec<RuntimeLogEntry>> {
        let active = Arc::clone(&self.active);
        run_blocking(
            move || {
                let path = format!("{}/{LOG_FILE}", attempt_dir(learner_id, attempt_id));
                match read_if_exists(&active, &path).map_err(RuntimeLogStoreError::io)? {
                    Some(bytes) => decode(learner_id, attempt_id, &bytes),
                    None => Ok(Vec::new()),
                }
            },
            RuntimeLogStoreError::io,
        )
        .await
    }

    async fn archive(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> RuntimeLogStoreResult<()> {
        let active = Arc::clone(&self.active);
        let archive = Arc::clone(&self.archive);
        self.with_attempt_lock((learner_id, attempt_id), move || {
            archive_blocking(&active, &archive, learner_id, attempt_id, None)
        })
        .await
    }

    async fn archive_consumed(
        &self,
        learner_id: LearnerId,
        attempt_id: AttemptId,
        consumed: usize,
    ) -> RuntimeLogStoreResult<()> {
        let active = Arc::clone(&self.active);
        let archive = Arc::clone(&self.archive);
        self.with_attempt_lock((learner_id, attempt_id), move || {
            archive_blocking(&active, &archive, learner_id, attempt_id, Some(consumed))
        })
        .await
    }

    async fn list_active(&self) -> RuntimeLogStoreResult<Vec<ActiveLog>> {
        let active = Arc::clone(&self.active);
        run_blocking(
            move || list_blocking(&active).map_err(RuntimeLogStoreError::io),
            RuntimeLogStoreError::io,
        )
        .await
    }
}
