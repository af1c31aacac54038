//! Shared world state for package ingestion BDD scenarios.

use crate::test_helpers::Stack;
use atrium::package::domain::Package;
use atrium::task::domain::TaskRecord;
use rstest::fixture;

/// Scenario world for package ingestion behaviour tests.
pub struct IngestionWorld {
    pub stack: Stack,
    pub archive: Option<Vec<u8>>,
    pub task: Option<TaskRecord>,
    pub package: Option<Package>,
}

impl IngestionWorld {
    /// Creates a world over a fresh temporary stack.
    pub fn new() -> eyre::Result<Self> {
        Ok(Self {
            stack: Stack::new()?,
            archive: None,
            task: None,
            package: None,
        })
    }

    /// Returns the package observed after ingestion finished.
    pub fn package(&self) -> Result<&Package, eyre::Report> {
        self.package
            .as_ref()
            .ok_or_else(|| eyre::eyre!("package has not been uploaded"))
    }

    /// Returns the finished task record.
    pub fn task(&self) -> Result<&TaskRecord, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("package has not been uploaded"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> IngestionWorld {
    IngestionWorld::new().expect("build ingestion world")
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
