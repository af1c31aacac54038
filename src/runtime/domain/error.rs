//! Error types for the runtime domain.

use thiserror::Error;

/// Errors returned while validating runtime values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeDomainError {
    /// A score value could not be interpreted.
    #[error(transparent)]
    Score(#[from] ScoreParseError),
}

/// A score entry that is not a finite number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("score value {0:?} is not a finite number")]
pub struct ScoreParseError(pub String);
