//! Unit tests for task status tracking.

mod status_tests;
