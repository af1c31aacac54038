//! Filesystem adapters rooted in capability directories.
//!
//! Each adapter opens its configured root once and performs every later
//! operation relative to that handle, so nothing outside the root can be
//! reached through a crafted name.

mod archive_store;
mod zip_extractor;

pub use archive_store::FsArchiveStore;
pub use zip_extractor::ZipPackageExtractor;
