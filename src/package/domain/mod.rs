//! Domain model for content packages.
//!
//! Everything here is pure: manifest parsing, path normalisation, standard
//! resolution and the package status state machine carry no I/O.

mod error;
mod ids;
pub mod manifest;
mod package;
mod path;
mod sniff;
mod standard;
mod status;

pub use error::{PackageDomainError, ParsePackageStatusError};
pub use ids::{ArchiveRef, GroupId, PackageId};
pub use manifest::{
    ManifestKind, ManifestLocation, ManifestNamespaces, ManifestParseError, ManifestParser,
    ParsedManifest,
};
pub use package::{Package, PersistedPackageData, ResolvedPackage};
pub use path::PackagePath;
pub use sniff::sniff_version;
pub use standard::{ContentStandard, Standard, StandardDescriptor, UnknownStandardError};
pub use status::PackageStatus;
