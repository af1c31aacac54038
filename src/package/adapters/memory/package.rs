//! In-memory repository for packages and content standards.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::package::{
    domain::{Package, PackageId, Standard, StandardDescriptor},
    ports::{
        PackageRepository, PackageRepositoryError, PackageRepositoryResult, StandardRepository,
    },
};

#[derive(Debug, Default)]
struct InMemoryState {
    packages: HashMap<PackageId, Package>,
    standards: HashMap<String, Standard>,
}

/// Thread-safe in-memory package and standard repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryPackageRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> PackageRepositoryError {
    PackageRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn store(&self, package: &Package) -> PackageRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.packages.contains_key(&package.id()) {
            return Err(PackageRepositoryError::DuplicatePackage(package.id()));
        }
        state.packages.insert(package.id(), package.clone());
        Ok(())
    }

    async fn update(&self, package: &Package) -> PackageRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .packages
            .get_mut(&package.id())
            .ok_or(PackageRepositoryError::NotFound(package.id()))?;
        *stored = package.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: PackageId) -> PackageRepositoryResult<Option<Package>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.packages.get(&id).cloned())
    }

    async fn remove(&self, id: PackageId) -> PackageRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(state.packages.remove(&id).is_some())
    }
}

#[async_trait]
impl StandardRepository for InMemoryPackageRepository {
    async fn get_or_create(
        &self,
        descriptor: StandardDescriptor,
    ) -> PackageRepositoryResult<Standard> {
        let mut state = self.state.write().map_err(lock_error)?;
        let standard = state
            .standards
            .entry(descriptor.name.to_owned())
            .or_insert_with(|| Standard::from(descriptor));
        Ok(standard.clone())
    }

    async fn find_by_name(&self, name: &str) -> PackageRepositoryResult<Option<Standard>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.standards.get(name).cloned())
    }
}
