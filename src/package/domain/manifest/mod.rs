//! Manifest parsing.
//!
//! A package carries either a content-packaging manifest (`imsmanifest.xml`)
//! or, as a best-effort fallback, an xAPI `tincan.xml`. Both are parsed
//! behind [`ManifestParser::parse`] with a dedicated strategy each; the two
//! schemas share nothing beyond yielding a launch href.

mod content_package;
mod tincan;

use super::PackagePath;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default descriptive-schema root namespace (content packaging 1.1.2).
pub const IMSCP_ROOT_V1P1P2: &str = "http://www.imsproject.org/xsd/imscp_rootv1p1p2";
/// Content packaging 1.1 namespace used by SCORM 2004 manifests.
pub const IMSCP_V1P1: &str = "http://www.imsglobal.org/xsd/imscp_v1p1";
/// SCORM 1.2 content-packaging extension namespace.
pub const ADLCP_ROOT_V1P2: &str = "http://www.adlnet.org/xsd/adlcp_rootv1p2";
/// XML schema-instance namespace.
pub const XML_SCHEMA_INSTANCE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Manifest flavour, determined by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// `imsmanifest.xml` content-packaging manifest.
    ContentPackage,
    /// `tincan.xml` activity descriptor, parsed best-effort.
    TinCan,
}

impl ManifestKind {
    /// Kinds in search preference order.
    pub const PREFERENCE: [Self; 2] = [Self::ContentPackage, Self::TinCan];

    /// Returns the file name that identifies this kind.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::ContentPackage => "imsmanifest.xml",
            Self::TinCan => "tincan.xml",
        }
    }
}

/// Manifest found inside an extracted package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// Path relative to the extraction root.
    pub path: PackagePath,
    /// Which parsing strategy applies.
    pub kind: ManifestKind,
}

/// Namespace bindings the content-package strategy matches against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestNamespaces {
    /// Accepted descriptive-schema root namespaces.
    pub content_packaging: Vec<String>,
    /// Standard-specific content-packaging extension namespace.
    pub adl_extension: String,
    /// Schema-instance namespace.
    pub schema_instance: String,
}

impl Default for ManifestNamespaces {
    fn default() -> Self {
        Self {
            content_packaging: vec![IMSCP_ROOT_V1P1P2.to_owned(), IMSCP_V1P1.to_owned()],
            adl_extension: ADLCP_ROOT_V1P2.to_owned(),
            schema_instance: XML_SCHEMA_INSTANCE.to_owned(),
        }
    }
}

impl ManifestNamespaces {
    /// Returns `true` when `uri` is an accepted descriptive-schema root.
    #[must_use]
    pub fn is_content_packaging(&self, uri: &str) -> bool {
        self.content_packaging.iter().any(|candidate| candidate == uri)
    }
}

/// Result of a successful manifest parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    /// Declared schema version, if any.
    pub version: Option<String>,
    /// Entry point relative to the extraction root.
    pub launch_path: PackagePath,
    /// Resource type declared by the standard extension (e.g. `sco`).
    pub resource_type: Option<String>,
}

/// Fatal manifest parse failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManifestParseError {
    /// The document is not well-formed UTF-8 XML.
    #[error("malformed manifest: {0}")]
    Malformed(String),
    /// No organization under the organizations root.
    #[error("no organization found in manifest")]
    NoOrganization,
    /// The first organization has no item.
    #[error("no item found in organization")]
    NoItem,
    /// The first item has no resource reference.
    #[error("no identifierref found in item")]
    NoIdentifierRef,
    /// No resource carries the referenced identifier.
    #[error("no resource found with identifier {0}")]
    NoResource(String),
    /// The referenced resource has no href.
    #[error("no href found in resource {0}")]
    NoHref(String),
    /// The resolved launch path is absolute or escapes the package.
    #[error("launch path {0} is not inside the package")]
    InvalidLaunchPath(String),
    /// A `tincan.xml` document declares no activity.
    #[error("no activity found in tincan manifest")]
    NoActivity,
    /// The first `tincan.xml` activity has no launch location.
    #[error("no launch location found in tincan activity")]
    NoLaunch,
}

impl ManifestParseError {
    /// Returns a stable machine-readable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::NoOrganization => "no_organization",
            Self::NoItem => "no_item",
            Self::NoIdentifierRef => "no_identifierref",
            Self::NoResource(_) => "no_resource",
            Self::NoHref(_) => "no_href",
            Self::InvalidLaunchPath(_) => "invalid_launch_path",
            Self::NoActivity => "no_activity",
            Self::NoLaunch => "no_launch",
        }
    }
}

/// Stateless manifest parser.
#[derive(Debug, Clone, Default)]
pub struct ManifestParser {
    namespaces: ManifestNamespaces,
}

impl ManifestParser {
    /// Creates a parser with explicit namespace bindings.
    #[must_use]
    pub const fn new(namespaces: ManifestNamespaces) -> Self {
        Self { namespaces }
    }

    /// Returns the namespace bindings in use.
    #[must_use]
    pub const fn namespaces(&self) -> &ManifestNamespaces {
        &self.namespaces
    }

    /// Parses manifest bytes found at `manifest_path`.
    ///
    /// The launch path is the manifest's directory joined with the href the
    /// manifest declares.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestParseError`] naming the first missing link in the
    /// chain, or `Malformed` when the bytes are not well-formed XML.
    pub fn parse(
        &self,
        kind: ManifestKind,
        manifest_path: &PackagePath,
        bytes: &[u8],
    ) -> Result<ParsedManifest, ManifestParseError> {
        let decoded = std::str::from_utf8(bytes)
            .map_err(|err| ManifestParseError::Malformed(err.to_string()))?;
        let text = decoded.strip_prefix('\u{feff}').unwrap_or(decoded);
        let document = roxmltree::Document::parse(text)
            .map_err(|err| ManifestParseError::Malformed(err.to_string()))?;

        let raw = match kind {
            ManifestKind::ContentPackage => content_package::extract(&document, &self.namespaces)?,
            ManifestKind::TinCan => tincan::extract(&document)?,
        };

        let launch_path = manifest_path
            .resolve_sibling(&raw.href)
            .map_err(|_| ManifestParseError::InvalidLaunchPath(raw.href.clone()))?;

        Ok(ParsedManifest {
            version: raw.version,
            launch_path,
            resource_type: raw.resource_type,
        })
    }
}

/// Fields a strategy pulls out of a document before path resolution.
struct RawManifest {
    version: Option<String>,
    href: String,
    resource_type: Option<String>,
}
