//! Application services for task status tracking.

mod tracker;

pub use tracker::{TaskStatusTracker, TaskTrackerError, TaskTrackerResult};
