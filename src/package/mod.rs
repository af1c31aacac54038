//! Content package ingestion for Atrium.
//!
//! An uploaded archive is stored, extracted into a directory scoped to its
//! package, searched for a manifest, and parsed to find the launch entry
//! point and the content standard it targets. Processing runs as a
//! background job whose outcome is reported through [`crate::task`].
//!
//! - Domain types and the manifest parser in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The ingestion pipeline in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
