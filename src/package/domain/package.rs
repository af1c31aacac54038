//! Package aggregate root.

use super::{
    ArchiveRef, GroupId, PackageDomainError, PackageId, PackagePath, PackageStatus, Standard,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Uploaded content package and the launch metadata resolved for it.
///
/// Created on upload and mutated only by the ingestion pipeline. Paths are
/// [`PackagePath`] values, so they can never be absolute or escape the
/// package's extraction directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    id: PackageId,
    group_id: GroupId,
    archive: ArchiveRef,
    archive_digest: String,
    standard: Option<Standard>,
    version: Option<String>,
    manifest_path: Option<PackagePath>,
    launch_path: Option<PackagePath>,
    status: PackageStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPackageData {
    /// Persisted package identifier.
    pub id: PackageId,
    /// Owning content group.
    pub group_id: GroupId,
    /// Stored archive blob.
    pub archive: ArchiveRef,
    /// Hex SHA-256 digest of the archive bytes.
    pub archive_digest: String,
    /// Resolved standard, if any.
    pub standard: Option<Standard>,
    /// Resolved version string, if any.
    pub version: Option<String>,
    /// Manifest location, if resolved.
    pub manifest_path: Option<PackagePath>,
    /// Launch entry point, if resolved.
    pub launch_path: Option<PackagePath>,
    /// Persisted status.
    pub status: PackageStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Launch metadata produced by a successful ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Manifest location relative to the extraction root.
    pub manifest_path: PackagePath,
    /// Launch entry point relative to the extraction root.
    pub launch_path: PackagePath,
    /// Sniffed or manifest-declared version.
    pub version: Option<String>,
    /// Resolved standard, `None` when the version maps to nothing known.
    pub standard: Option<Standard>,
}

impl Package {
    /// Creates a package in [`PackageStatus::Uploaded`].
    #[must_use]
    pub fn new(
        id: PackageId,
        group_id: GroupId,
        archive: ArchiveRef,
        archive_digest: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        Self {
            id,
            group_id,
            archive,
            archive_digest: archive_digest.into(),
            standard: None,
            version: None,
            manifest_path: None,
            launch_path: None,
            status: PackageStatus::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a package from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPackageData) -> Self {
        Self {
            id: data.id,
            group_id: data.group_id,
            archive: data.archive,
            archive_digest: data.archive_digest,
            standard: data.standard,
            version: data.version,
            manifest_path: data.manifest_path,
            launch_path: data.launch_path,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the package identifier.
    #[must_use]
    pub const fn id(&self) -> PackageId {
        self.id
    }

    /// Returns the owning content group.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns the stored archive reference.
    #[must_use]
    pub const fn archive(&self) -> &ArchiveRef {
        &self.archive
    }

    /// Returns the hex SHA-256 digest of the uploaded archive.
    #[must_use]
    pub fn archive_digest(&self) -> &str {
        &self.archive_digest
    }

    /// Returns the resolved standard, if any.
    #[must_use]
    pub const fn standard(&self) -> Option<&Standard> {
        self.standard.as_ref()
    }

    /// Returns the resolved version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the manifest location, if resolved.
    #[must_use]
    pub const fn manifest_path(&self) -> Option<&PackagePath> {
        self.manifest_path.as_ref()
    }

    /// Returns the launch entry point, if resolved.
    #[must_use]
    pub const fn launch_path(&self) -> Option<&PackagePath> {
        self.launch_path.as_ref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> PackageStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the package into [`PackageStatus::Processing`] at job start.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidStatusTransition`] if the
    /// transition is not permitted.
    pub fn mark_processing(&mut self, clock: &impl Clock) -> Result<(), PackageDomainError> {
        self.transition_to(PackageStatus::Processing, clock)
    }

    /// Records resolved launch metadata and moves to [`PackageStatus::Ready`].
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidStatusTransition`] unless the
    /// package is processing.
    pub fn mark_ready(
        &mut self,
        resolved: ResolvedPackage,
        clock: &impl Clock,
    ) -> Result<(), PackageDomainError> {
        self.transition_to(PackageStatus::Ready, clock)?;
        self.manifest_path = Some(resolved.manifest_path);
        self.launch_path = Some(resolved.launch_path);
        self.version = resolved.version;
        self.standard = resolved.standard;
        Ok(())
    }

    /// Moves the package to [`PackageStatus::Error`].
    ///
    /// Launch metadata from an earlier run is cleared so a failed re-run
    /// never leaves a stale entry point behind.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidStatusTransition`] unless the
    /// package is processing.
    pub fn mark_error(&mut self, clock: &impl Clock) -> Result<(), PackageDomainError> {
        self.transition_to(PackageStatus::Error, clock)?;
        self.manifest_path = None;
        self.launch_path = None;
        self.version = None;
        self.standard = None;
        Ok(())
    }

    fn transition_to(
        &mut self,
        target: PackageStatus,
        clock: &impl Clock,
    ) -> Result<(), PackageDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(PackageDomainError::InvalidStatusTransition {
                package_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = clock.utc();
        Ok(())
    }
}
