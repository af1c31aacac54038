//! Explicit configuration threaded through component constructors.
//!
//! Every field has a default, so a partial JSON document only needs to name
//! what differs from the defaults.

use crate::package::domain::ManifestNamespaces;
use crate::package::services::RetryPolicy;
use crate::telemetry::LoggerConfig;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtriumConfig {
    /// Filesystem roots.
    pub storage: StorageConfig,
    /// Ingestion pipeline settings.
    pub ingestion: IngestionConfig,
    /// Consolidation job settings.
    pub consolidation: ConsolidationConfig,
    /// Logging settings.
    pub logging: LoggerConfig,
}

impl AtriumConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid JSON or
    /// a field has the wrong shape.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Default configuration with every storage root placed under `base`.
    #[must_use]
    pub fn rooted_at(base: &Utf8Path) -> Self {
        Self {
            storage: StorageConfig::rooted_at(base),
            ..Self::default()
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be deserialised.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Filesystem roots used by the storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Uploaded archive blobs.
    pub upload_root: Utf8PathBuf,
    /// Per-package extraction directories.
    pub extraction_root: Utf8PathBuf,
    /// Active runtime logs.
    pub log_root: Utf8PathBuf,
    /// Archived runtime logs, kept apart from active ones.
    pub log_archive_root: Utf8PathBuf,
}

impl StorageConfig {
    /// Places every root under `base`.
    #[must_use]
    pub fn rooted_at(base: &Utf8Path) -> Self {
        Self {
            upload_root: base.join("uploads"),
            extraction_root: base.join("extracted"),
            log_root: base.join("runtime_logs"),
            log_archive_root: base.join("runtime_logs_archive"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::rooted_at(Utf8Path::new("data"))
    }
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Attempts per ingestion run.
    pub retry: RetryPolicy,
    /// Files scanned for an embedded version, in order, before the launch
    /// path itself.
    pub index_candidates: Vec<String>,
    /// Namespace bindings for content-packaging manifests.
    pub namespaces: ManifestNamespaces,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            index_candidates: vec!["index_lms.html".to_owned(), "index.html".to_owned()],
            namespaces: ManifestNamespaces::default(),
        }
    }
}

/// Consolidation job settings.
///
/// The sweep interval is also the staleness bound between a learner's log
/// and the consolidated store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Seconds between sweeps.
    pub sweep_interval_secs: u64,
    /// Completion status values that mark an attempt complete.
    pub finished_statuses: Vec<String>,
}

impl ConsolidationConfig {
    /// Returns the pause between sweeps.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Returns `true` when `status` is one of the finished statuses.
    #[must_use]
    pub fn is_finished(&self, status: &str) -> bool {
        let trimmed = status.trim();
        self.finished_statuses
            .iter()
            .any(|finished| finished.eq_ignore_ascii_case(trimmed))
    }
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
            finished_statuses: vec!["completed".to_owned(), "passed".to_owned()],
        }
    }
}
