//! Adapter implementations for task status ports.

pub mod memory;
pub mod tokio_queue;
