//! Zip extraction into `<extraction_root>/<package_id>/`.

use crate::fs_utils::{
    SharedDir, open_existing_subdir, open_or_create_dir, open_or_create_subdir, read_if_exists,
    remove_dir_all_if_exists, run_blocking, sorted_entries,
};
use crate::package::{
    domain::{ManifestKind, ManifestLocation, PackageId, PackagePath},
    ports::{ExtractionError, ExtractionResult, PackageExtractor},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::sync::Arc;
use tracing::{debug, info};
use zip::ZipArchive;

/// Extracts zip archives beneath a capability-scoped extraction root.
#[derive(Debug, Clone)]
pub struct ZipPackageExtractor {
    root: SharedDir,
}

impl ZipPackageExtractor {
    /// Opens the extraction root, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the root.
    pub fn open(extraction_root: &Utf8Path) -> io::Result<Self> {
        Ok(Self {
            root: Arc::new(open_or_create_dir(extraction_root)?),
        })
    }
}

#[async_trait]
impl PackageExtractor for ZipPackageExtractor {
    async fn extract(&self, package_id: PackageId, archive: &[u8]) -> ExtractionResult<()> {
        let root = Arc::clone(&self.root);
        let bytes = archive.to_vec();
        let written = run_blocking(
            move || unpack(&root, &package_id.to_string(), bytes),
            ExtractionError::io,
        )
        .await?;
        info!(package_id = %package_id, files = written, "archive extracted");
        Ok(())
    }

    async fn locate_manifest(
        &self,
        package_id: PackageId,
    ) -> ExtractionResult<Option<ManifestLocation>> {
        let root = Arc::clone(&self.root);
        run_blocking(
            move || {
                let Some(package_dir) = open_existing_subdir(&root, &package_id.to_string())
                    .map_err(ExtractionError::io)?
                else {
                    return Ok(None);
                };
                search_manifest(&package_dir).map_err(ExtractionError::io)
            },
            ExtractionError::io,
        )
        .await
    }

    async fn read_file(
        &self,
        package_id: PackageId,
        path: &PackagePath,
    ) -> ExtractionResult<Option<Vec<u8>>> {
        let root = Arc::clone(&self.root);
        let relative = format!("{package_id}/{path}");
        run_blocking(
            move || read_if_exists(&root, &relative).map_err(ExtractionError::io),
            ExtractionError::io,
        )
        .await
    }

    async fn remove(&self, package_id: PackageId) -> ExtractionResult<()> {
        let root = Arc::clone(&self.root);
        run_blocking(
            move || {
                remove_dir_all_if_exists(&root, &package_id.to_string())
                    .map_err(ExtractionError::io)
            },
            ExtractionError::io,
        )
        .await
    }
}

/// Validated archive member.
struct Member {
    index: usize,
    path: PackagePath,
    is_dir: bool,
}

/// Unpacks every member, returning the number of files written.
///
/// All member names are validated before the destination is touched, so an
/// unsafe archive leaves any earlier extraction in place.
fn unpack(root: &Dir, destination: &str, bytes: Vec<u8>) -> ExtractionResult<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ExtractionError::MalformedArchive(err.to_string()))?;

    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|err| ExtractionError::MalformedArchive(err.to_string()))?;
        let name = entry.name();
        if entry.enclosed_name().is_none() {
            return Err(ExtractionError::UnsafeEntry(name.to_owned()));
        }
        match PackagePath::new(name) {
            Ok(path) => members.push(Member {
                index,
                path,
                is_dir: entry.is_dir(),
            }),
            // `./` style directory entries normalise to nothing.
            Err(_) if entry.is_dir() => {}
            Err(_) => return Err(ExtractionError::UnsafeEntry(name.to_owned())),
        }
    }

    remove_dir_all_if_exists(root, destination).map_err(ExtractionError::io)?;
    let package_dir = open_or_create_subdir(root, destination).map_err(ExtractionError::io)?;

    let mut written = 0;
    for member in members {
        if member.is_dir {
            package_dir
                .create_dir_all(member.path.as_str())
                .map_err(ExtractionError::io)?;
            continue;
        }
        if let Some(parent) = member.path.parent() {
            package_dir
                .create_dir_all(parent)
                .map_err(ExtractionError::io)?;
        }
        let mut entry = archive
            .by_index(member.index)
            .map_err(|err| ExtractionError::MalformedArchive(err.to_string()))?;
        let mut file = package_dir
            .create(member.path.as_str())
            .map_err(ExtractionError::io)?;
        io::copy(&mut entry, &mut file).map_err(|err| {
            if err.kind() == io::ErrorKind::InvalidData {
                ExtractionError::MalformedArchive(err.to_string())
            } else {
                ExtractionError::io(err)
            }
        })?;
        written += 1;
    }
    Ok(written)
}

/// Breadth-first search, lexicographic within each directory.
///
/// Collects the first hit per manifest kind so the whole tree is consulted
/// for the primary manifest before the secondary one is accepted.
fn search_manifest(package_dir: &Dir) -> io::Result<Option<ManifestLocation>> {
    let mut found: Vec<ManifestLocation> = Vec::new();
    let mut pending: VecDeque<String> = VecDeque::from([String::new()]);

    while let Some(relative) = pending.pop_front() {
        let listing = if relative.is_empty() {
            sorted_entries(package_dir)?
        } else {
            sorted_entries(&package_dir.open_dir(&relative)?)?
        };
        for (name, is_dir) in listing {
            let joined = if relative.is_empty() {
                name.clone()
            } else {
                format!("{relative}/{name}")
            };
            if is_dir {
                pending.push_back(joined);
                continue;
            }
            let Some(kind) = ManifestKind::PREFERENCE
                .into_iter()
                .find(|kind| name.eq_ignore_ascii_case(kind.file_name()))
            else {
                continue;
            };
            if found.iter().any(|location| location.kind == kind) {
                continue;
            }
            if let Ok(path) = PackagePath::new(&joined) {
                debug!(manifest = %path, kind = kind.file_name(), "manifest candidate");
                found.push(ManifestLocation { path, kind });
            }
        }
        if found
            .iter()
            .any(|location| location.kind == ManifestKind::ContentPackage)
        {
            break;
        }
    }

    Ok(ManifestKind::PREFERENCE.into_iter().find_map(|kind| {
        found
            .iter()
            .find(|location| location.kind == kind)
            .cloned()
    }))
}
