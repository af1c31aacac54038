//! Archive blobs stored as `<upload_root>/<package_id>.zip`.

use crate::fs_utils::{
    SharedDir, open_or_create_dir, read_if_exists, remove_file_if_exists, run_blocking,
};
use crate::package::{
    domain::{ArchiveRef, PackageId},
    ports::{ArchiveStore, ArchiveStoreError, ArchiveStoreResult},
};
use async_trait::async_trait;
use camino::Utf8Path;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Filesystem-backed archive store.
#[derive(Debug, Clone)]
pub struct FsArchiveStore {
    root: SharedDir,
}

impl FsArchiveStore {
    /// Opens the upload root, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the root.
    pub fn open(upload_root: &Utf8Path) -> io::Result<Self> {
        Ok(Self {
            root: Arc::new(open_or_create_dir(upload_root)?),
        })
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn put(&self, package_id: PackageId, bytes: &[u8]) -> ArchiveStoreResult<ArchiveRef> {
        let root = Arc::clone(&self.root);
        let archive = ArchiveRef::new(format!("{package_id}.zip"));
        let key = archive.as_str().to_owned();
        let staging = format!("{key}.partial");
        let blob = bytes.to_vec();
        run_blocking(
            move || {
                root.write(&staging, &blob).map_err(ArchiveStoreError::io)?;
                root.rename(&staging, &root, &key)
                    .map_err(ArchiveStoreError::io)
            },
            ArchiveStoreError::io,
        )
        .await?;
        debug!(package_id = %package_id, archive = %archive, "archive stored");
        Ok(archive)
    }

    async fn read(&self, archive: &ArchiveRef) -> ArchiveStoreResult<Vec<u8>> {
        let root = Arc::clone(&self.root);
        let key = archive.as_str().to_owned();
        let found = run_blocking(
            move || read_if_exists(&root, &key).map_err(ArchiveStoreError::io),
            ArchiveStoreError::io,
        )
        .await?;
        found.ok_or_else(|| ArchiveStoreError::NotFound(archive.clone()))
    }

    async fn remove(&self, archive: &ArchiveRef) -> ArchiveStoreResult<()> {
        let root = Arc::clone(&self.root);
        let key = archive.as_str().to_owned();
        run_blocking(
            move || remove_file_if_exists(&root, &key).map_err(ArchiveStoreError::io),
            ArchiveStoreError::io,
        )
        .await
    }
}
