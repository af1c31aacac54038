//! Error types for package domain validation.

use super::{PackageId, PackageStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating package values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PackageDomainError {
    /// The path is absolute, empty, or escapes the extraction root.
    #[error("invalid package-relative path: {0}")]
    InvalidPath(String),

    /// The requested status change is not permitted.
    #[error("invalid status transition for package {package_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Package identifier.
        package_id: PackageId,
        /// Current status.
        from: PackageStatus,
        /// Requested status.
        to: PackageStatus,
    },
}

/// Error returned while parsing package statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown package status: {0}")]
pub struct ParsePackageStatusError(pub String);
