//! Step definitions for package ingestion scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
