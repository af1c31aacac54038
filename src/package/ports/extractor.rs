//! Package extraction port.
//!
//! Every package owns one extraction directory addressed by its identifier,
//! so extractors need no locking across packages.

use crate::package::domain::{ManifestLocation, PackageId, PackagePath};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Unpacks archives and reads files from extracted packages.
#[async_trait]
pub trait PackageExtractor: Send + Sync {
    /// Unpacks `archive` into the package's extraction directory.
    ///
    /// Any earlier extraction for the same package is removed first, so a
    /// re-run leaves exactly the archive's contents behind.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MalformedArchive`] when the archive cannot
    /// be read and [`ExtractionError::UnsafeEntry`] when an entry would be
    /// written outside the extraction directory.
    async fn extract(&self, package_id: PackageId, archive: &[u8]) -> ExtractionResult<()>;

    /// Searches the extracted tree for a manifest.
    ///
    /// The whole tree is searched for the primary manifest before the
    /// secondary one is considered; within a kind, shallower paths win and
    /// ties break lexicographically.
    async fn locate_manifest(
        &self,
        package_id: PackageId,
    ) -> ExtractionResult<Option<ManifestLocation>>;

    /// Reads an extracted file, returning `None` when it does not exist.
    async fn read_file(
        &self,
        package_id: PackageId,
        path: &PackagePath,
    ) -> ExtractionResult<Option<Vec<u8>>>;

    /// Removes the package's extraction directory if present.
    async fn remove(&self, package_id: PackageId) -> ExtractionResult<()>;
}

/// Errors returned by package extractors.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// The archive is not a readable zip file.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// An entry name is absolute or escapes the extraction directory.
    #[error("archive entry escapes the extraction directory: {0}")]
    UnsafeEntry(String),

    /// Filesystem failure.
    #[error("extraction I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExtractionError {
    /// Wraps a filesystem error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
