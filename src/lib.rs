//! Atrium: e-learning content ingestion and learner runtime tracking.
//!
//! Atrium accepts SCORM-style content packages as zip archives, unpacks
//! them in the background, and resolves their launch metadata. Learners
//! then run an attempt against a ready package; every value they write is
//! logged durably and folded into canonical progress by a periodic job.
//!
//! # Architecture
//!
//! Atrium follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (filesystem, memory)
//!
//! # Modules
//!
//! - [`package`]: Package upload, manifest parsing and ingestion
//! - [`runtime`]: Learner runtime writes, reads and consolidation
//! - [`task`]: Background task tracking and the task queue
//! - [`config`]: Runtime configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
mod fs_utils;
pub mod package;
pub mod runtime;
pub mod task;
pub mod telemetry;
