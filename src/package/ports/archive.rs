//! Archive blob storage port.

use crate::package::domain::{ArchiveRef, PackageId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for archive store operations.
pub type ArchiveStoreResult<T> = Result<T, ArchiveStoreError>;

/// Keeps uploaded archives until they are deleted with their package.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Stores the archive uploaded for `package_id`, replacing any earlier
    /// blob for the same package.
    async fn put(&self, package_id: PackageId, bytes: &[u8]) -> ArchiveStoreResult<ArchiveRef>;

    /// Reads a stored archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveStoreError::NotFound`] when no blob exists.
    async fn read(&self, archive: &ArchiveRef) -> ArchiveStoreResult<Vec<u8>>;

    /// Removes a stored archive. Removing a missing blob is not an error.
    async fn remove(&self, archive: &ArchiveRef) -> ArchiveStoreResult<()>;
}

/// Errors returned by archive stores.
#[derive(Debug, Clone, Error)]
pub enum ArchiveStoreError {
    /// No blob exists for the reference.
    #[error("archive not found: {0}")]
    NotFound(ArchiveRef),

    /// Storage failure.
    #[error("archive storage error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl ArchiveStoreError {
    /// Wraps a storage error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
