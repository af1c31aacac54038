//! The ingestion pipeline: upload, extraction, manifest resolution.
//!
//! `submit_package` returns as soon as the archive is stored and the job is
//! queued. The job body, [`IngestionPipeline::process_package`], drives the
//! package through `processing` into `ready` or `error` and reports the
//! outcome through the task status tracker.

use crate::config::IngestionConfig;
use crate::package::{
    domain::{
        ContentStandard, GroupId, ManifestParseError, ManifestParser, Package, PackageDomainError,
        PackageId, PackagePath, PackageStatus, ResolvedPackage, Standard, UnknownStandardError,
        sniff_version,
    },
    ports::{
        ArchiveStore, ArchiveStoreError, ExtractionError, PackageExtractor, PackageRepository,
        PackageRepositoryError, StandardRepository,
    },
};
use crate::task::{
    domain::{TaskId, TaskKind, TaskRecord},
    ports::{TaskQueue, TaskQueueError, TaskRepository},
    services::{TaskStatusTracker, TaskTrackerError},
};
use mockable::Clock;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors raised by the ingestion pipeline.
///
/// Variants that end a job are reported in the task record through
/// [`IngestionError::failure_payload`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// No package exists for the identifier.
    #[error("package {0} not found")]
    PackageNotFound(PackageId),
    /// The stored archive could not be read or written.
    #[error(transparent)]
    Archive(#[from] ArchiveStoreError),
    /// The archive could not be unpacked.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Neither manifest file exists in the extracted tree.
    #[error("no manifest found in package {package_id}")]
    ManifestNotFound {
        /// Package that was searched.
        package_id: PackageId,
    },
    /// The manifest could not be parsed.
    #[error(transparent)]
    ManifestParse(#[from] ManifestParseError),
    /// The package is not in a status the operation can start from.
    #[error(transparent)]
    Domain(#[from] PackageDomainError),
    /// Package or standard persistence failed.
    #[error(transparent)]
    Repository(#[from] PackageRepositoryError),
    /// Task status bookkeeping failed.
    #[error(transparent)]
    Tracker(#[from] TaskTrackerError),
    /// The task queue rejected the job.
    #[error(transparent)]
    Queue(#[from] TaskQueueError),
}

impl IngestionError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PackageNotFound(_) => "package_not_found",
            Self::Archive(_) => "archive_unavailable",
            Self::Extraction(_) => "extraction_failed",
            Self::ManifestNotFound { .. } => "manifest_not_found",
            Self::ManifestParse(_) => "manifest_parse",
            Self::Domain(_) => "invalid_status_transition",
            Self::Repository(_) => "persistence",
            Self::Tracker(_) => "task_tracking",
            Self::Queue(_) => "queue_unavailable",
        }
    }

    /// Returns the manifest parse reason, if this is a parse failure.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::ManifestParse(err) => Some(err.reason()),
            _ => None,
        }
    }

    /// Returns the payload recorded in a failed task record.
    #[must_use]
    pub fn failure_payload(&self) -> Value {
        json!({
            "error": self.to_string(),
            "code": self.code(),
            "reason": self.reason(),
        })
    }
}

/// Result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Ports the pipeline is assembled from.
pub struct IngestionPorts<P, A, X, T, Q> {
    /// Package and standard persistence.
    pub packages: Arc<P>,
    /// Archive blob storage.
    pub archives: Arc<A>,
    /// Archive extraction and extracted-file access.
    pub extractor: Arc<X>,
    /// Task status persistence.
    pub tasks: Arc<T>,
    /// Background job execution.
    pub queue: Arc<Q>,
}

/// Orchestrates package ingestion.
pub struct IngestionPipeline<P, A, X, T, Q, C>
where
    P: PackageRepository + StandardRepository + 'static,
    A: ArchiveStore + 'static,
    X: PackageExtractor + 'static,
    T: TaskRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + Send + Sync + 'static,
{
    packages: Arc<P>,
    archives: Arc<A>,
    extractor: Arc<X>,
    queue: Arc<Q>,
    tracker: TaskStatusTracker<T, C>,
    parser: Arc<ManifestParser>,
    config: Arc<IngestionConfig>,
    clock: Arc<C>,
}

impl<P, A, X, T, Q, C> Clone for IngestionPipeline<P, A, X, T, Q, C>
where
    P: PackageRepository + StandardRepository + 'static,
    A: ArchiveStore + 'static,
    X: PackageExtractor + 'static,
    T: TaskRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            packages: Arc::clone(&self.packages),
            archives: Arc::clone(&self.archives),
            extractor: Arc::clone(&self.extractor),
            queue: Arc::clone(&self.queue),
            tracker: self.tracker.clone(),
            parser: Arc::clone(&self.parser),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, A, X, T, Q, C> IngestionPipeline<P, A, X, T, Q, C>
where
    P: PackageRepository + StandardRepository + 'static,
    A: ArchiveStore + 'static,
    X: PackageExtractor + 'static,
    T: TaskRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Assembles a pipeline from its ports.
    #[must_use]
    pub fn new(
        ports: IngestionPorts<P, A, X, T, Q>,
        config: IngestionConfig,
        clock: Arc<C>,
    ) -> Self {
        let parser = ManifestParser::new(config.namespaces.clone());
        Self {
            packages: ports.packages,
            archives: ports.archives,
            extractor: ports.extractor,
            queue: ports.queue,
            tracker: TaskStatusTracker::new(ports.tasks, Arc::clone(&clock)),
            parser: Arc::new(parser),
            config: Arc::new(config),
            clock,
        }
    }

    /// Returns the task tracker the pipeline reports through.
    #[must_use]
    pub const fn tracker(&self) -> &TaskStatusTracker<T, C> {
        &self.tracker
    }

    /// Stores an uploaded archive and queues its ingestion.
    ///
    /// Returns without waiting for the job; poll the returned task to follow
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error when the archive cannot be stored, the records
    /// cannot be created, or the queue rejects the job. A rejected job is
    /// also recorded as a failed task.
    pub async fn submit_package(
        &self,
        archive: &[u8],
        group_id: GroupId,
    ) -> IngestionResult<(PackageId, TaskId)> {
        let package_id = PackageId::new();
        let digest = format!("{:x}", Sha256::digest(archive));
        let archive_ref = self.archives.put(package_id, archive).await?;
        let package = Package::new(package_id, group_id, archive_ref, digest, &*self.clock);
        self.packages.store(&package).await?;
        info!(%package_id, %group_id, bytes = archive.len(), "package uploaded");

        let task_id = self.enqueue(package_id).await?;
        Ok((package_id, task_id))
    }

    /// Queues a fresh ingestion run for an existing package.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::PackageNotFound`] for unknown packages and
    /// the queue or tracker error when the job cannot be queued.
    pub async fn resubmit_package(&self, package_id: PackageId) -> IngestionResult<TaskId> {
        self.find_package(package_id).await?;
        self.enqueue(package_id).await
    }

    async fn enqueue(&self, package_id: PackageId) -> IngestionResult<TaskId> {
        let task_id = TaskId::new();
        self.tracker
            .create(
                task_id,
                TaskKind::PackageIngestion {
                    package_id: package_id.into_inner(),
                },
            )
            .await?;

        let pipeline = self.clone();
        let job = Box::pin(async move { pipeline.run_job(package_id, task_id).await });
        if let Err(err) = self.queue.submit(task_id, job).await {
            let failure = IngestionError::from(err);
            error!(%package_id, %task_id, error = %failure, "ingestion job rejected by queue");
            self.record_outcome(task_id, false, failure.failure_payload())
                .await;
            return Err(failure);
        }
        debug!(%package_id, %task_id, "ingestion job queued");
        Ok(task_id)
    }

    /// Job entry point used by the queue. Errors are recorded, not returned.
    pub async fn run_job(&self, package_id: PackageId, task_id: TaskId) {
        if let Err(err) = self.process_package(package_id, task_id).await {
            debug!(%package_id, %task_id, code = err.code(), "ingestion job ended with error");
        }
    }

    /// Runs ingestion for `package_id` and records the outcome on `task_id`.
    ///
    /// Safe to re-run: the extraction directory is replaced and the package
    /// re-enters `processing` from any status. Every error, including a
    /// missing package or a failed status update, finishes the task as a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that moved the package to `error`, or the
    /// lookup/persistence error that prevented the run from starting.
    pub async fn process_package(
        &self,
        package_id: PackageId,
        task_id: TaskId,
    ) -> IngestionResult<Package> {
        let outcome = self.ingest_package(package_id, task_id).await;
        if let Err(err) = &outcome {
            self.record_outcome(task_id, false, err.failure_payload())
                .await;
        }
        outcome
    }

    async fn ingest_package(
        &self,
        package_id: PackageId,
        task_id: TaskId,
    ) -> IngestionResult<Package> {
        let mut package = self.find_package(package_id).await?;
        package.mark_processing(&*self.clock)?;
        self.packages.update(&package).await?;
        info!(%package_id, %task_id, "ingestion started");

        match self.ingest_with_retry(&package).await {
            Ok(resolved) => {
                package.mark_ready(resolved, &*self.clock)?;
                self.packages.update(&package).await?;
                info!(
                    %package_id,
                    %task_id,
                    launch_path = package.launch_path().map(PackagePath::as_str),
                    version = package.version(),
                    standard = package.standard().map(Standard::name),
                    "ingestion finished"
                );
                self.record_outcome(task_id, true, json!({ "package_id": package_id }))
                    .await;
                Ok(package)
            }
            Err(err) => {
                error!(%package_id, %task_id, code = err.code(), error = %err, "ingestion failed");
                package.mark_error(&*self.clock)?;
                self.packages.update(&package).await?;
                Err(err)
            }
        }
    }

    /// Cancels a queued or running job and marks its task revoked.
    ///
    /// A package left in `processing` by the cancelled job is moved to
    /// `error`; a package whose job never started stays `uploaded` so it can
    /// be resubmitted. Returns `false` when the task had already finished.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Tracker`] for unknown tasks or persistence
    /// failures.
    pub async fn cancel_task(&self, task_id: TaskId) -> IngestionResult<bool> {
        let signalled = self.queue.cancel(task_id).await?;
        let record = match self.tracker.mark_revoked(task_id).await {
            Ok(record) => record,
            Err(TaskTrackerError::InvalidTransition(_)) => {
                info!(%task_id, signalled, "cancellation ignored, task already finished");
                return Ok(false);
            }
            Err(other) => return Err(other.into()),
        };

        let TaskKind::PackageIngestion {
            package_id: package_uuid,
        } = record.kind();
        let package_id = PackageId::from_uuid(package_uuid);
        if let Some(mut package) = self.packages.find_by_id(package_id).await? {
            if package.status() == PackageStatus::Processing {
                package.mark_error(&*self.clock)?;
                self.packages.update(&package).await?;
            }
        }
        info!(%task_id, %package_id, signalled, "ingestion cancelled");
        Ok(true)
    }

    /// Returns the task status record for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Tracker`] wrapping `NotFound` for unknown
    /// tasks.
    pub async fn poll_task(&self, task_id: TaskId) -> IngestionResult<TaskRecord> {
        Ok(self.tracker.query(task_id).await?)
    }

    /// Returns the package record.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::PackageNotFound`] for unknown packages.
    pub async fn get_package(&self, package_id: PackageId) -> IngestionResult<Package> {
        self.find_package(package_id).await
    }

    /// Removes a package with its extraction directory and archive blob.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::PackageNotFound`] for unknown packages and
    /// the storage error when a removal fails.
    pub async fn delete_package(&self, package_id: PackageId) -> IngestionResult<()> {
        let package = self.find_package(package_id).await?;
        if package.status() == PackageStatus::Processing {
            warn!(%package_id, "deleting a package while it is processing");
        }
        self.extractor.remove(package_id).await?;
        self.archives.remove(package.archive()).await?;
        self.packages.remove(package_id).await?;
        info!(%package_id, "package deleted");
        Ok(())
    }

    async fn find_package(&self, package_id: PackageId) -> IngestionResult<Package> {
        self.packages
            .find_by_id(package_id)
            .await?
            .ok_or(IngestionError::PackageNotFound(package_id))
    }

    async fn ingest_with_retry(&self, package: &Package) -> IngestionResult<ResolvedPackage> {
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.ingest_once(package).await {
                Ok(resolved) => return Ok(resolved),
                Err(err) if policy.allows_retry_after(attempt) => {
                    warn!(
                        package_id = %package.id(),
                        attempt,
                        max_attempts = policy.max_attempts(),
                        error = %err,
                        "ingestion attempt failed, retrying"
                    );
                    tokio::time::sleep(policy.backoff()).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn ingest_once(&self, package: &Package) -> IngestionResult<ResolvedPackage> {
        let package_id = package.id();
        let archive = self.archives.read(package.archive()).await?;
        self.extractor.extract(package_id, &archive).await?;

        let location = self
            .extractor
            .locate_manifest(package_id)
            .await?
            .ok_or(IngestionError::ManifestNotFound { package_id })?;
        let manifest = self
            .extractor
            .read_file(package_id, &location.path)
            .await?
            .ok_or(IngestionError::ManifestNotFound { package_id })?;
        debug!(%package_id, manifest = %location.path, "manifest located");

        let parsed = self.parser.parse(location.kind, &location.path, &manifest)?;
        let sniffed = self.sniff_index(package_id, &parsed.launch_path).await;
        let standard = self.resolve_standard(package_id, parsed.version.as_deref()).await?;

        Ok(ResolvedPackage {
            manifest_path: location.path,
            launch_path: parsed.launch_path,
            version: sniffed.or(parsed.version),
            standard,
        })
    }

    /// Scans the first existing index candidate for an embedded version.
    async fn sniff_index(
        &self,
        package_id: PackageId,
        launch_path: &PackagePath,
    ) -> Option<String> {
        let candidates = self
            .config
            .index_candidates
            .iter()
            .filter_map(|candidate| PackagePath::new(candidate).ok())
            .chain(std::iter::once(launch_path.clone()));

        for candidate in candidates {
            let bytes = match self.extractor.read_file(package_id, &candidate).await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(err) => {
                    warn!(%package_id, index = %candidate, error = %err, "index candidate unreadable, skipping");
                    continue;
                }
            };
            let version = sniff_version(&String::from_utf8_lossy(&bytes));
            debug!(%package_id, index = %candidate, version = ?version, "index file scanned");
            return version;
        }
        warn!(%package_id, "no index file found, using manifest version");
        None
    }

    async fn resolve_standard(
        &self,
        package_id: PackageId,
        version: Option<&str>,
    ) -> IngestionResult<Option<Standard>> {
        let Some(descriptor) = ContentStandard::resolve(version).descriptor() else {
            let unknown = UnknownStandardError {
                version: version.map(str::to_owned),
            };
            warn!(%package_id, warning = %unknown, "standard left unset");
            return Ok(None);
        };
        Ok(Some(self.packages.get_or_create(descriptor).await?))
    }

    /// Records a job outcome; a task revoked in the meantime keeps its status.
    async fn record_outcome(&self, task_id: TaskId, success: bool, payload: Value) {
        match self.tracker.complete(task_id, success, payload).await {
            Ok(_) => {}
            Err(TaskTrackerError::InvalidTransition(err)) => {
                info!(%task_id, reason = %err, "task already finished, outcome not recorded");
            }
            Err(err) => {
                error!(%task_id, error = %err, "failed to record task outcome");
            }
        }
    }
}
