//! Human-readable credit line for a media file.

use alpenflora_core::model::RightsMetadata;

/// Credit used when a file carries no usable rights fields.
pub const FALLBACK_ATTRIBUTION: &str = "Wikimedia Commons";

/// Drop every `<...>` span and trim. An unclosed `<` swallows the rest.
pub fn strip_tags(text: &str) -> String {
    let mut inside = false;
    let stripped: String = text
        .chars()
        .filter(|&c| match c {
            '<' => {
                inside = true;
                false
            }
            '>' => {
                inside = false;
                false
            }
            _ => !inside,
        })
        .collect();
    stripped.trim().to_string()
}

/// `artist | credit | license`, keeping only the fields that are
/// non-empty once markup is removed.
pub fn attribution(rights: &RightsMetadata) -> String {
    let parts: Vec<String> = [
        rights.artist(),
        rights.credit(),
        rights.license_short_name(),
    ]
    .into_iter()
    .flatten()
    .map(strip_tags)
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        FALLBACK_ATTRIBUTION.to_string()
    } else {
        parts.join(" | ")
    }
}
