//! Domain model for asynchronous task status records.
//!
//! A task record starts `pending` and moves exactly once into a terminal
//! status. Terminal records are write-once.

mod error;
mod ids;
mod record;
mod status;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use record::{PersistedTaskData, TaskKind, TaskRecord};
pub use status::TaskStatus;
