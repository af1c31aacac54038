//! Adapter implementations for runtime tracking ports.

pub mod fs;
pub mod memory;
