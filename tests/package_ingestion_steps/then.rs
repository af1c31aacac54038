//! Then steps for package ingestion BDD scenarios.

use super::world::IngestionWorld;
use atrium::package::domain::PackageStatus;
use atrium::task::domain::TaskStatus;
use rstest_bdd_macros::then;

#[then(r#"the ingestion task finishes as "{status}""#)]
fn task_finishes_as(world: &IngestionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected task {}, found {} with {:?}",
            expected.as_str(),
            task.status().as_str(),
            task.result()
        ));
    }
    Ok(())
}

#[then(r#"the package status is "{status}""#)]
fn package_status_is(world: &IngestionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = PackageStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let package = world.package()?;
    if package.status() != expected {
        return Err(eyre::eyre!(
            "expected package {}, found {}",
            expected.as_str(),
            package.status().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the package standard is "{name}""#)]
fn package_standard_is(world: &IngestionWorld, name: String) -> Result<(), eyre::Report> {
    let standard = world
        .package()?
        .standard()
        .ok_or_else(|| eyre::eyre!("package has no standard"))?;
    if standard.name() != name {
        return Err(eyre::eyre!("expected standard {name}, found {}", standard.name()));
    }
    Ok(())
}

#[then("the package has no standard")]
fn package_has_no_standard(world: &IngestionWorld) -> Result<(), eyre::Report> {
    if let Some(standard) = world.package()?.standard() {
        return Err(eyre::eyre!("unexpected standard {}", standard.name()));
    }
    Ok(())
}

#[then(r#"the launch path is "{path}""#)]
fn launch_path_is(world: &IngestionWorld, path: String) -> Result<(), eyre::Report> {
    let launch = world
        .package()?
        .launch_path()
        .ok_or_else(|| eyre::eyre!("package has no launch path"))?;
    if launch.as_str() != path {
        return Err(eyre::eyre!("expected launch path {path}, found {}", launch.as_str()));
    }
    Ok(())
}

#[then(r#"the task failure code is "{code}""#)]
fn failure_code_is(world: &IngestionWorld, code: String) -> Result<(), eyre::Report> {
    let recorded = world
        .task()?
        .result()
        .and_then(|result| result.get("code"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| eyre::eyre!("task result carries no failure code"))?;
    if recorded != code {
        return Err(eyre::eyre!("expected failure code {code}, found {recorded}"));
    }
    Ok(())
}
