//! Unit tests for the runtime module.

mod log_store_tests;
mod support;
mod tracking_tests;
