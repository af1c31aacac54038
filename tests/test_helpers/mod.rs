//! Shared wiring and archive builders for integration tests.

use atrium::config::AtriumConfig;
use atrium::package::{
    adapters::{
        fs::{FsArchiveStore, ZipPackageExtractor},
        memory::InMemoryPackageRepository,
    },
    services::{IngestionPipeline, IngestionPorts},
};
use atrium::runtime::{
    adapters::{
        fs::FsRuntimeLogStore,
        memory::{InMemoryProgressRepository, InMemoryRuntimeCache},
    },
    services::{ConsolidationJob, RuntimeTrackingService},
};
use atrium::task::{
    adapters::{memory::InMemoryTaskRepository, tokio_queue::TokioTaskQueue},
    domain::{TaskId, TaskRecord, TaskStatus},
};
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Pipeline wired to filesystem storage and the tokio queue.
pub type Pipeline = IngestionPipeline<
    InMemoryPackageRepository,
    FsArchiveStore,
    ZipPackageExtractor,
    InMemoryTaskRepository,
    TokioTaskQueue,
    DefaultClock,
>;

/// Tracking service wired to the filesystem log store.
pub type Tracking = RuntimeTrackingService<
    FsRuntimeLogStore,
    InMemoryRuntimeCache,
    InMemoryProgressRepository,
    InMemoryPackageRepository,
    DefaultClock,
>;

/// Consolidation job over the same stores as [`Tracking`].
pub type Consolidation =
    ConsolidationJob<FsRuntimeLogStore, InMemoryProgressRepository, DefaultClock>;

/// Every service assembled over one temporary storage root.
pub struct Stack {
    _dir: TempDir,
    /// Configuration the stack was built from.
    pub config: AtriumConfig,
    /// Ingestion pipeline.
    pub pipeline: Pipeline,
    /// Runtime tracking service.
    pub tracking: Tracking,
    /// Consolidation job.
    pub consolidation: Consolidation,
    /// Runtime cache, exposed so tests can evict it.
    pub cache: Arc<InMemoryRuntimeCache>,
    /// Consolidated progress store.
    pub progress: Arc<InMemoryProgressRepository>,
    /// Runtime log store.
    pub log: Arc<FsRuntimeLogStore>,
}

impl Stack {
    /// Builds a stack rooted in a fresh temporary directory.
    pub fn new() -> eyre::Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| eyre::eyre!("non utf-8 temp path: {}", path.display()))?;
        let config = AtriumConfig::rooted_at(&root);
        let clock = Arc::new(DefaultClock);

        let packages = Arc::new(InMemoryPackageRepository::new());
        let pipeline = IngestionPipeline::new(
            IngestionPorts {
                packages: Arc::clone(&packages),
                archives: Arc::new(FsArchiveStore::open(&config.storage.upload_root)?),
                extractor: Arc::new(ZipPackageExtractor::open(&config.storage.extraction_root)?),
                tasks: Arc::new(InMemoryTaskRepository::new()),
                queue: Arc::new(TokioTaskQueue::new()),
            },
            config.ingestion.clone(),
            Arc::clone(&clock),
        );

        let log = Arc::new(FsRuntimeLogStore::open(
            &config.storage.log_root,
            &config.storage.log_archive_root,
        )?);
        let cache = Arc::new(InMemoryRuntimeCache::new());
        let progress = Arc::new(InMemoryProgressRepository::new());
        let tracking = RuntimeTrackingService::new(
            Arc::clone(&log),
            Arc::clone(&cache),
            Arc::clone(&progress),
            packages,
            Arc::clone(&clock),
        );
        let consolidation = ConsolidationJob::new(
            Arc::clone(&log),
            Arc::clone(&progress),
            config.consolidation.clone(),
            clock,
        );

        Ok(Self {
            _dir: dir,
            config,
            pipeline,
            tracking,
            consolidation,
            cache,
            progress,
            log,
        })
    }

    /// Polls a task until it leaves `pending`.
    pub async fn wait_for_task(&self, task_id: TaskId) -> eyre::Result<TaskRecord> {
        for _ in 0..200 {
            let record = self.pipeline.poll_task(task_id).await?;
            if record.status() != TaskStatus::Pending {
                return Ok(record);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Err(eyre::eyre!("task {task_id} still pending"))
    }
}

/// Builds a zip archive in memory from `(name, contents)` pairs.
pub fn build_zip(entries: &[(&str, &[u8])]) -> eyre::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, SimpleFileOptions::default())?;
        writer.write_all(contents)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Content-packaging manifest declaring `schema_version` and launching `href`.
pub fn manifest(schema_version: &str, href: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="course" version="1.0"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata>
    <schema>ADL SCORM</schema>
    <schemaversion>{schema_version}</schemaversion>
  </metadata>
  <organizations default="ORG1">
    <organization identifier="ORG1">
      <title>Course</title>
      <item identifier="ITEM1" identifierref="R1"><title>Lesson</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="R1" type="webcontent" adlcp:scormtype="sco" href="{href}"/>
  </resources>
</manifest>
"#
    )
}
