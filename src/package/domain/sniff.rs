//! Version sniffing over launch-page content.

const MARKER: &str = "version: ";

/// Finds the first `version: <digits and dots>` marker in `content`.
///
/// Authoring tools embed their runtime version in the generated index page;
/// when present it is more specific than the manifest's schema version.
#[must_use]
pub fn sniff_version(content: &str) -> Option<String> {
    content.match_indices(MARKER).find_map(|(start, _)| {
        let tail = content.get(start + MARKER.len()..)?;
        let end = tail
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(tail.len());
        let version = tail.get(..end)?;
        (!version.is_empty()).then(|| version.to_owned())
    })
}
