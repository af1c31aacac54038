//! In-memory archive blob store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::package::{
    domain::{ArchiveRef, PackageId},
    ports::{ArchiveStore, ArchiveStoreError, ArchiveStoreResult},
};

/// Archive store that keeps blobs in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchiveStore {
    blobs: Arc<DashMap<ArchiveRef, Vec<u8>>>,
}

impl InMemoryArchiveStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` when no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl ArchiveStore for InMemoryArchiveStore {
    async fn put(&self, package_id: PackageId, bytes: &[u8]) -> ArchiveStoreResult<ArchiveRef> {
        let archive = ArchiveRef::new(format!("{package_id}.zip"));
        self.blobs.insert(archive.clone(), bytes.to_vec());
        Ok(archive)
    }

    async fn read(&self, archive: &ArchiveRef) -> ArchiveStoreResult<Vec<u8>> {
        self.blobs
            .get(archive)
            .map(|blob| blob.value().clone())
            .ok_or_else(|| ArchiveStoreError::NotFound(archive.clone()))
    }

    async fn remove(&self, archive: &ArchiveRef) -> ArchiveStoreResult<()> {
        self.blobs.remove(archive);
        Ok(())
    }
}
