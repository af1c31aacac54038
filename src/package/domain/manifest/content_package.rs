//! Strategy for content-packaging manifests (`imsmanifest.xml`).
//!
//! Follows the chain organizations → organization → item → resource → href.
//! Each missing link is its own error so callers can report a precise cause.

use super::{ManifestNamespaces, ManifestParseError, RawManifest};
use roxmltree::{Document, Node};

pub(super) fn extract(
    document: &Document<'_>,
    namespaces: &ManifestNamespaces,
) -> Result<RawManifest, ManifestParseError> {
    let root = document.root_element();

    let version = root
        .descendants()
        .find(|node| is_cp_element(*node, "schemaversion", namespaces))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned);

    let organization = root
        .descendants()
        .filter(|node| is_cp_element(*node, "organizations", namespaces))
        .find_map(|organizations| first_child(organizations, "organization", namespaces))
        .ok_or(ManifestParseError::NoOrganization)?;

    let item = organization
        .descendants()
        .skip(1)
        .find(|node| is_cp_element(*node, "item", namespaces))
        .ok_or(ManifestParseError::NoItem)?;

    let identifier_ref = item
        .attribute("identifierref")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ManifestParseError::NoIdentifierRef)?;

    let resource = root
        .descendants()
        .filter(|node| is_cp_element(*node, "resources", namespaces))
        .flat_map(|resources| resources.children())
        .find(|node| {
            is_cp_element(*node, "resource", namespaces)
                && node.attribute("identifier").map(str::trim) == Some(identifier_ref)
        })
        .ok_or_else(|| ManifestParseError::NoResource(identifier_ref.to_owned()))?;

    let href = resource
        .attribute("href")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ManifestParseError::NoHref(identifier_ref.to_owned()))?;

    // SCORM 1.2 spells it `scormtype`, 2004 `scormType`.
    let resource_type = resource
        .attributes()
        .find(|attribute| {
            attribute.namespace() == Some(namespaces.adl_extension.as_str())
                && attribute.name().eq_ignore_ascii_case("scormtype")
        })
        .map(|attribute| attribute.value().to_owned());

    Ok(RawManifest {
        version,
        href: href.to_owned(),
        resource_type,
    })
}

fn is_cp_element(node: Node<'_, '_>, local_name: &str, namespaces: &ManifestNamespaces) -> bool {
    let tag = node.tag_name();
    node.is_element()
        && tag.name() == local_name
        && tag
            .namespace()
            .is_some_and(|uri| namespaces.is_content_packaging(uri))
}

fn first_child<'a, 'input>(
    node: Node<'a, 'input>,
    local_name: &str,
    namespaces: &ManifestNamespaces,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| is_cp_element(*child, local_name, namespaces))
}
