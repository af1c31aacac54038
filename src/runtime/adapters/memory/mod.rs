//! In-memory adapters for runtime tracking.

mod cache;
mod progress;

pub use cache::InMemoryRuntimeCache;
pub use progress::InMemoryProgressRepository;
