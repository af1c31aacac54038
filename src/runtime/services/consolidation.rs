//! Periodic consolidation of runtime logs into the progress store.
//!
//! Each sweep folds every eligible active log into per-element rows and the
//! attempt's derived status, then archives exactly the entries it read.

use crate::config::ConsolidationConfig;
use crate::runtime::{
    domain::{
        Attempt, AttemptId, Element, LearnerId, RuntimeLogEntry,
        vocabulary::{
            LESSON_STATUS_12, SUCCESS_STATUS_2004, is_completion_element, is_score_element,
            success_from_lesson_status,
        },
    },
    ports::{
        ActiveLog, AttemptRepository, ElementRepository, ProgressRepositoryError, RuntimeLogStore,
        RuntimeLogStoreError,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors raised while consolidating a single log or listing the logs.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    /// Log listing, reading or archiving failed.
    #[error(transparent)]
    Log(#[from] RuntimeLogStoreError),
    /// Attempt or element persistence failed.
    #[error(transparent)]
    Progress(#[from] ProgressRepositoryError),
    /// The log sits under a learner who does not own the attempt.
    #[error("log for attempt {attempt_id} is filed under learner {learner_id}, not its owner {owner_id}")]
    OwnerMismatch {
        /// Attempt named by the log.
        attempt_id: AttemptId,
        /// Learner the log is filed under.
        learner_id: LearnerId,
        /// Learner who owns the attempt.
        owner_id: LearnerId,
    },
}

/// Counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Logs folded and archived.
    pub processed: usize,
    /// Logs left alone.
    pub skipped: usize,
    /// Logs that failed and stay active.
    pub errors: usize,
}

enum Outcome {
    Processed,
    Skipped,
}

#[derive(Default)]
struct Folded {
    latest: BTreeMap<String, (String, DateTime<Utc>)>,
    completion: Option<String>,
    success: Option<String>,
    score: Option<f64>,
}

impl Folded {
    fn from_entries(entries: &[RuntimeLogEntry]) -> Self {
        let mut folded = Self::default();
        for entry in entries {
            let element_id = entry.element_id();
            let value = entry.value();
            folded
                .latest
                .insert(element_id.to_owned(), (value.to_owned(), entry.timestamp));

            if is_completion_element(element_id) {
                folded.completion = Some(value.to_owned());
            }
            match element_id {
                SUCCESS_STATUS_2004 => folded.success = Some(value.to_owned()),
                LESSON_STATUS_12 => {
                    if let Some(success) = success_from_lesson_status(value) {
                        folded.success = Some(success.to_owned());
                    }
                }
                _ => {}
            }
            if is_score_element(element_id) {
                match Attempt::parse_score(value) {
                    Ok(score) => folded.score = Some(score),
                    Err(err) => warn!(element_id, error = %err, "score entry skipped"),
                }
            }
        }
        folded
    }
}

/// Background job that turns runtime logs into durable progress.
pub struct ConsolidationJob<L, R, C>
where
    L: RuntimeLogStore,
    R: AttemptRepository + ElementRepository,
    C: Clock + Send + Sync,
{
    log: Arc<L>,
    progress: Arc<R>,
    config: Arc<ConsolidationConfig>,
    clock: Arc<C>,
}

impl<L, R, C> Clone for ConsolidationJob<L, R, C>
where
    L: RuntimeLogStore,
    R: AttemptRepository + ElementRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            progress: Arc::clone(&self.progress),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L, R, C> ConsolidationJob<L, R, C>
where
    L: RuntimeLogStore,
    R: AttemptRepository + ElementRepository,
    C: Clock + Send + Sync,
{
    /// Creates a consolidation job.
    #[must_use]
    pub fn new(log: Arc<L>, progress: Arc<R>, config: ConsolidationConfig, clock: Arc<C>) -> Self {
        Self {
            log,
            progress,
            config: Arc::new(config),
            clock,
        }
    }

    /// Decides whether a log needs folding.
    ///
    /// Complete attempts are final. A log last modified strictly before the
    /// previous consolidation is skipped; one stamped at that same instant is
    /// folded again, since filesystem and wall clocks differ in resolution.
    /// Logs without an attempt are still folded.
    #[must_use]
    pub fn should_process(attempt: Option<&Attempt>, modified_at: DateTime<Utc>) -> bool {
        match attempt {
            None => true,
            Some(known) if known.is_complete() => false,
            Some(known) => known
                .last_processed()
                .is_none_or(|processed| modified_at >= processed),
        }
    }

    /// Runs one pass over every active log.
    ///
    /// A failure on one log is counted and logged; the sweep moves on.
    ///
    /// # Errors
    ///
    /// Returns an error only when the active logs cannot be listed.
    pub async fn sweep(&self) -> Result<SweepReport, ConsolidationError> {
        let active = self.log.list_active().await?;
        let mut report = SweepReport::default();
        for log in &active {
            match self.consolidate(log).await {
                Ok(Outcome::Processed) => report.processed += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(err) => {
                    error!(
                        learner_id = %log.learner_id,
                        attempt_id = %log.attempt_id,
                        error = %err,
                        "consolidation failed, log kept active"
                    );
                    report.errors += 1;
                }
            }
        }
        info!(
            processed = report.processed,
            skipped = report.skipped,
            errors = report.errors,
            "consolidation sweep finished"
        );
        Ok(report)
    }

    /// Sweeps on the configured interval until `shutdown` fires.
    ///
    /// A sweep in progress is allowed to finish.
    pub async fn run_periodically(&self, shutdown: &CancellationToken) {
        let period = self.config.sweep_interval().max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "consolidation started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if let Err(err) = self.sweep().await {
                error!(error = %err, "consolidation sweep aborted");
            }
        }
        info!("consolidation stopped");
    }

    async fn consolidate(&self, log: &ActiveLog) -> Result<Outcome, ConsolidationError> {
        let attempt = self.progress.find_by_id(log.attempt_id).await?;
        if let Some(owner_id) = attempt
            .as_ref()
            .map(Attempt::learner_id)
            .filter(|owner_id| *owner_id != log.learner_id)
        {
            return Err(ConsolidationError::OwnerMismatch {
                attempt_id: log.attempt_id,
                learner_id: log.learner_id,
                owner_id,
            });
        }
        if !Self::should_process(attempt.as_ref(), log.modified_at) {
            debug!(attempt_id = %log.attempt_id, "log unchanged or attempt complete, skipped");
            return Ok(Outcome::Skipped);
        }

        // Taken before the read so later appends look newer than this pass.
        let read_at = self.clock.utc();
        let entries = self.log.read_entries(log.learner_id, log.attempt_id).await?;
        let folded = Folded::from_entries(&entries);

        let elements: Vec<Element> = folded
            .latest
            .iter()
            .map(|(element_id, (value, written_at))| Element {
                attempt_id: log.attempt_id,
                element_id: element_id.clone(),
                value: value.clone(),
                updated_at: *written_at,
            })
            .collect();
        self.progress.upsert_all(&elements).await?;

        if let Some(mut current) = attempt {
            self.apply(&mut current, &folded);
            current.mark_processed(read_at);
            self.progress.update(&current).await?;
        } else {
            warn!(
                learner_id = %log.learner_id,
                attempt_id = %log.attempt_id,
                "no attempt for log, elements stored without status update"
            );
        }

        self.log
            .archive_consumed(log.learner_id, log.attempt_id, entries.len())
            .await?;
        debug!(
            attempt_id = %log.attempt_id,
            entries = entries.len(),
            elements = elements.len(),
            "log consolidated"
        );
        Ok(Outcome::Processed)
    }

    fn apply(&self, attempt: &mut Attempt, folded: &Folded) {
        if let Some(status) = &folded.completion {
            attempt.record_completion_status(status.as_str(), self.config.is_finished(status));
        }
        if let Some(status) = &folded.success {
            attempt.record_success_status(status.as_str());
        }
        if let Some(score) = folded.score {
            attempt.record_score(score);
        }
    }
}
