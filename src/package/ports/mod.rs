//! Port contracts for package ingestion.
//!
//! Ports define infrastructure-agnostic interfaces used by the ingestion
//! pipeline: where package records live, where archive blobs are kept, and
//! how an archive becomes a searchable directory tree.

pub mod archive;
pub mod extractor;
pub mod repository;

pub use archive::{ArchiveStore, ArchiveStoreError, ArchiveStoreResult};
pub use extractor::{ExtractionError, ExtractionResult, PackageExtractor};
pub use repository::{
    PackageRepository, PackageRepositoryError, PackageRepositoryResult, StandardRepository,
};
