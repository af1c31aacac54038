//! In-memory adapters for task status tracking.

mod task;

pub use task::InMemoryTaskRepository;
