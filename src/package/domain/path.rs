//! Package-relative paths.

use super::PackageDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised path relative to a package's extraction root.
///
/// The wrapped value never starts with `/`, never contains `.` or `..`
/// segments, and uses `/` as the only separator, so it cannot address
/// anything outside the package's own directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackagePath(String);

impl PackagePath {
    /// Normalises and validates a package-relative path.
    ///
    /// Backslashes are treated as separators and `.`/`..` segments are
    /// resolved.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidPath`] when the path is empty,
    /// absolute, carries a URL scheme or drive prefix, or escapes the root.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PackageDomainError> {
        let raw = raw.as_ref();
        normalize(raw)
            .map(Self)
            .ok_or_else(|| PackageDomainError::InvalidPath(raw.to_owned()))
    }

    /// Resolves `href` against the directory containing this path.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidPath`] when the combined path is
    /// invalid.
    pub fn resolve_sibling(&self, href: &str) -> Result<Self, PackageDomainError> {
        if is_absolute(href) {
            return Err(PackageDomainError::InvalidPath(href.to_owned()));
        }
        match self.parent() {
            Some(parent) => Self::new(format!("{parent}/{href}")),
            None => Self::new(href),
        }
    }

    /// Returns the directory portion, or `None` for a root-level file.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }

    /// Returns the final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the path as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_absolute(raw: &str) -> bool {
    raw.starts_with('/') || raw.starts_with('\\')
}

fn normalize(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    if unified.starts_with('/') {
        return None;
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    let first = segments.first()?;
    if first.contains(':') {
        return None;
    }
    Some(segments.join("/"))
}

impl TryFrom<String> for PackagePath {
    type Error = PackageDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackagePath> for String {
    fn from(value: PackagePath) -> Self {
        value.0
    }
}

impl AsRef<str> for PackagePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
