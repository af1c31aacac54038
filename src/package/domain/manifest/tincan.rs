//! Best-effort strategy for xAPI `tincan.xml` descriptors.
//!
//! The schema has nothing in common with content packaging: the first
//! `activity` under `activities` supplies its `launch` location, and no
//! schema version is declared.

use super::{ManifestParseError, RawManifest};
use roxmltree::{Document, Node};

pub(super) fn extract(document: &Document<'_>) -> Result<RawManifest, ManifestParseError> {
    let root = document.root_element();
    if root.tag_name().name() != "tincan" {
        return Err(ManifestParseError::Malformed(format!(
            "expected tincan root element, found {}",
            root.tag_name().name()
        )));
    }

    let activity = root
        .descendants()
        .filter(|node| is_named(*node, "activities"))
        .flat_map(|activities| activities.children())
        .find(|node| is_named(*node, "activity"))
        .ok_or(ManifestParseError::NoActivity)?;

    let href = activity
        .children()
        .find(|node| is_named(*node, "launch"))
        .and_then(|launch| launch.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(ManifestParseError::NoLaunch)?;

    Ok(RawManifest {
        version: None,
        href: href.to_owned(),
        resource_type: activity.attribute("type").map(str::to_owned),
    })
}

fn is_named(node: Node<'_, '_>, local_name: &str) -> bool {
    node.is_element() && node.tag_name().name() == local_name
}
