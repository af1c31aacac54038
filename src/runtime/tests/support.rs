//! Shared fixtures for runtime tests.

use crate::config::ConsolidationConfig;
use crate::package::{
    adapters::memory::InMemoryPackageRepository,
    domain::{ArchiveRef, GroupId, Package, PackageId},
    ports::PackageRepository,
};
use crate::runtime::{
    adapters::{
        fs::FsRuntimeLogStore,
        memory::{InMemoryProgressRepository, InMemoryRuntimeCache},
    },
    domain::{AttemptId, LearnerId},
    services::{ConsolidationJob, RuntimeTrackingService},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use tempfile::TempDir;

pub(super) type Tracking = RuntimeTrackingService<
    FsRuntimeLogStore,
    InMemoryRuntimeCache,
    InMemoryProgressRepository,
    InMemoryPackageRepository,
    DefaultClock,
>;

pub(super) type Consolidation =
    ConsolidationJob<FsRuntimeLogStore, InMemoryProgressRepository, DefaultClock>;

pub(super) struct Runtime {
    _dir: TempDir,
    pub(super) log_root: Utf8PathBuf,
    pub(super) archive_root: Utf8PathBuf,
    pub(super) log: Arc<FsRuntimeLogStore>,
    pub(super) cache: Arc<InMemoryRuntimeCache>,
    pub(super) progress: Arc<InMemoryProgressRepository>,
    pub(super) packages: Arc<InMemoryPackageRepository>,
}

impl Runtime {
    pub(super) fn tracking(&self) -> Tracking {
        RuntimeTrackingService::new(
            Arc::clone(&self.log),
            Arc::clone(&self.cache),
            Arc::clone(&self.progress),
            Arc::clone(&self.packages),
            Arc::new(DefaultClock),
        )
    }

    pub(super) fn consolidation(&self) -> Consolidation {
        ConsolidationJob::new(
            Arc::clone(&self.log),
            Arc::clone(&self.progress),
            ConsolidationConfig::default(),
            Arc::new(DefaultClock),
        )
    }

    pub(super) async fn stored_package(&self) -> PackageId {
        let package_id = PackageId::new();
        let package = Package::new(
            package_id,
            GroupId::new(),
            ArchiveRef::new(format!("{package_id}.zip")),
            "digest",
            &DefaultClock,
        );
        self.packages
            .store(&package)
            .await
            .expect("store package");
        package_id
    }

    pub(super) fn log_path(&self, learner_id: LearnerId, attempt_id: AttemptId) -> Utf8PathBuf {
        attempt_file(&self.log_root, learner_id, attempt_id)
    }

    pub(super) fn archive_path(&self, learner_id: LearnerId, attempt_id: AttemptId) -> Utf8PathBuf {
        attempt_file(&self.archive_root, learner_id, attempt_id)
    }
}

fn attempt_file(root: &Utf8Path, learner_id: LearnerId, attempt_id: AttemptId) -> Utf8PathBuf {
    root.join(learner_id.to_string())
        .join(attempt_id.to_string())
        .join("progress.json")
}

#[fixture]
pub(super) fn runtime() -> Runtime {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    let log_root = root.join("runtime_logs");
    let archive_root = root.join("runtime_logs_archive");
    let log = Arc::new(FsRuntimeLogStore::open(&log_root, &archive_root).expect("open log store"));
    Runtime {
        _dir: dir,
        log_root,
        archive_root,
        log,
        cache: Arc::new(InMemoryRuntimeCache::new()),
        progress: Arc::new(InMemoryProgressRepository::new()),
        packages: Arc::new(InMemoryPackageRepository::new()),
    }
}
