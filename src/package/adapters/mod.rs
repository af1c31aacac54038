//! Adapter implementations for package ingestion ports.

pub mod fs;
pub mod memory;
