//! Learner runtime tracking for Atrium.
//!
//! Writes from a learner session land in a per-attempt append-only log
//! before anything else; a non-authoritative cache serves repeated reads.
//! A periodic consolidation job folds each log into canonical element and
//! attempt records, then archives what it read.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Tracking, session and consolidation services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
