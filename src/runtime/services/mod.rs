//! Application services for runtime tracking.

mod consolidation;
mod session;
mod tracking;

pub use consolidation::{ConsolidationError, ConsolidationJob, SweepReport};
pub use session::{LmsErrorCode, LmsSession};
pub use tracking::{RuntimeTrackingError, RuntimeTrackingResult, RuntimeTrackingService};
