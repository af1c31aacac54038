//! When steps for package ingestion BDD scenarios.

use super::world::{IngestionWorld, run_async};
use atrium::package::domain::GroupId;
use rstest_bdd_macros::when;

#[when("the package is uploaded")]
fn upload_package(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    let archive = world
        .archive
        .take()
        .ok_or_else(|| eyre::eyre!("missing archive in scenario world"))?;

    let (package_id, task_id) =
        run_async(world.stack.pipeline.submit_package(&archive, GroupId::new()))?;
    let task = run_async(world.stack.wait_for_task(task_id))?;
    let package = run_async(world.stack.pipeline.get_package(package_id))?;

    world.task = Some(task);
    world.package = Some(package);
    Ok(())
}
