//! In-memory adapters for package ingestion.

mod archive;
mod package;

pub use archive::InMemoryArchiveStore;
pub use package::InMemoryPackageRepository;
