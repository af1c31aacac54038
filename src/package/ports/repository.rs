//! Repository ports for packages and content standards.

use crate::package::domain::{Package, PackageId, Standard, StandardDescriptor};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for package and standard repository operations.
pub type PackageRepositoryResult<T> = Result<T, PackageRepositoryError>;

/// Package persistence contract.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Stores a newly uploaded package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::DuplicatePackage`] when the
    /// identifier already exists.
    async fn store(&self, package: &Package) -> PackageRepositoryResult<()>;

    /// Persists changes to an existing package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::NotFound`] when the package does
    /// not exist.
    async fn update(&self, package: &Package) -> PackageRepositoryResult<()>;

    /// Finds a package by identifier.
    ///
    /// Returns `None` when the package does not exist.
    async fn find_by_id(&self, id: PackageId) -> PackageRepositoryResult<Option<Package>>;

    /// Removes a package record, returning whether it existed.
    async fn remove(&self, id: PackageId) -> PackageRepositoryResult<bool>;
}

/// Content standard lookup, unique by name.
#[async_trait]
pub trait StandardRepository: Send + Sync {
    /// Returns the standard named by `descriptor`, creating it on first use.
    async fn get_or_create(
        &self,
        descriptor: StandardDescriptor,
    ) -> PackageRepositoryResult<Standard>;

    /// Finds a standard by its unique name.
    async fn find_by_name(&self, name: &str) -> PackageRepositoryResult<Option<Standard>>;
}

/// Errors returned by package and standard repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PackageRepositoryError {
    /// A package with the same identifier already exists.
    #[error("duplicate package identifier: {0}")]
    DuplicatePackage(PackageId),

    /// The package was not found.
    #[error("package not found: {0}")]
    NotFound(PackageId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PackageRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
