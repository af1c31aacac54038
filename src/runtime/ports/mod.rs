//! Port contracts for runtime tracking.

pub mod cache;
pub mod log_store;
pub mod repository;

pub use cache::RuntimeCache;
pub use log_store::{ActiveLog, RuntimeLogStore, RuntimeLogStoreError, RuntimeLogStoreResult};
pub use repository::{
    AttemptRepository, ElementRepository, ProgressRepositoryError, ProgressRepositoryResult,
};
