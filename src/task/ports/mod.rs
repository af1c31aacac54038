//! Port contracts for task status tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod queue;
pub mod repository;

pub use queue::{TaskJob, TaskQueue, TaskQueueError, TaskQueueResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
