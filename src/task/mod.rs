//! Asynchronous task status tracking for Atrium.
//!
//! Ingestion jobs run outside the request path. This module keeps a durable
//! record of each job's outcome that is independent of the queue executing
//! it, and defines the narrow queue contract the rest of the crate relies on:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
