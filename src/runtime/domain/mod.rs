//! Domain model for runtime tracking.

mod attempt;
mod element;
mod error;
mod ids;
mod log;
pub mod vocabulary;

pub use attempt::{Attempt, PersistedAttemptData, clamp_score};
pub use element::{Element, ElementValue};
pub use error::{RuntimeDomainError, ScoreParseError};
pub use ids::{AttemptId, LearnerId};
pub use log::{ElementWrite, RuntimeLogEntry};
