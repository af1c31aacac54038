//! Package processing status and its transition rules.

use super::ParsePackageStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of an uploaded package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Archive stored, processing not started.
    Uploaded,
    /// An ingestion job is working on the package.
    Processing,
    /// Manifest resolved; the package can be launched.
    Ready,
    /// Ingestion failed; the task record carries the cause.
    Error,
}

impl PackageStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    /// Returns `true` when an ingestion job has finished with this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    /// Returns `true` when `self -> target` is a permitted transition.
    ///
    /// Any status may re-enter `Processing` so a job can be re-run for the
    /// same package; `Ready` and `Error` are only reachable from
    /// `Processing`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Processing => true,
            Self::Ready | Self::Error => matches!(self, Self::Processing),
            Self::Uploaded => false,
        }
    }
}

impl TryFrom<&str> for PackageStatus {
    type Error = ParsePackageStatusError;

    fn try_from(value: &str) -> Result<Self, ParsePackageStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "uploaded" => Ok(Self::Uploaded),
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "error" => Ok(Self::Error),
            _ => Err(ParsePackageStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
