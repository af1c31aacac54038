//! Application services for package ingestion.

mod ingestion;
mod retry;

pub use ingestion::{IngestionError, IngestionPipeline, IngestionPorts, IngestionResult};
pub use retry::RetryPolicy;
