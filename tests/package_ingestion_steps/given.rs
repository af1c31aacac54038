//! Given steps for package ingestion BDD scenarios.

use super::world::IngestionWorld;
use crate::test_helpers::{build_zip, manifest};
use rstest_bdd_macros::given;

#[given(r#"a package with schema version "{version}" launching "{href}""#)]
fn package_with_manifest(
    world: &mut IngestionWorld,
    version: String,
    href: String,
) -> Result<(), eyre::Report> {
    let manifest_xml = manifest(&version, &href);
    world.archive = Some(build_zip(&[
        ("imsmanifest.xml", manifest_xml.as_bytes()),
        ("content/index.html", b"<html><body>lesson</body></html>"),
        ("start.html", b"<html><body>start</body></html>"),
    ])?);
    Ok(())
}

#[given("an archive without a manifest")]
fn archive_without_manifest(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    world.archive = Some(build_zip(&[("index.html", b"<html></html>")])?);
    Ok(())
}
