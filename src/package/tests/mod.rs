//! Unit tests for the package module.

mod support;
