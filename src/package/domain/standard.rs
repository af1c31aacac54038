//! Content standard resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content-packaging standard a package targets.
///
/// Resolution is a closed lookup: anything outside the table is
/// [`ContentStandard::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentStandard {
    /// SCORM 1.2.
    Scorm12,
    /// SCORM 2004 (4th Edition).
    Scorm2004,
    /// Version absent or not in the resolution table.
    Unknown,
}

impl ContentStandard {
    /// Resolves a manifest schema version.
    #[must_use]
    pub fn resolve(version: Option<&str>) -> Self {
        match version.map(str::trim) {
            Some("1.2") => Self::Scorm12,
            Some("2004") => Self::Scorm2004,
            _ => Self::Unknown,
        }
    }

    /// Returns the persisted name/version pair, or `None` for `Unknown`.
    #[must_use]
    pub const fn descriptor(self) -> Option<StandardDescriptor> {
        match self {
            Self::Scorm12 => Some(StandardDescriptor {
                name: "SCORM 1.2",
                version: "1.2",
            }),
            Self::Scorm2004 => Some(StandardDescriptor {
                name: "SCORM 2004",
                version: "4th Edition",
            }),
            Self::Unknown => None,
        }
    }
}

/// Static name/version pair from the resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardDescriptor {
    /// Unique standard name.
    pub name: &'static str,
    /// Edition or version label.
    pub version: &'static str,
}

/// Persisted standard record, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Standard {
    name: String,
    version: String,
}

impl Standard {
    /// Creates a standard record.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns the standard name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the version label.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl From<StandardDescriptor> for Standard {
    fn from(descriptor: StandardDescriptor) -> Self {
        Self::new(descriptor.name, descriptor.version)
    }
}

/// Non-fatal condition: the manifest version maps to no known standard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no content standard for schema version {version:?}")]
pub struct UnknownStandardError {
    /// Schema version found in the manifest, if any.
    pub version: Option<String>,
}
