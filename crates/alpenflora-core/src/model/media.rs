use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw rights/description metadata attached to a media file.
///
/// Values are kept verbatim, including any inline markup; callers strip it
/// when composing display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightsMetadata(BTreeMap<String, String>);

impl RightsMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn artist(&self) -> Option<&str> {
        self.get("Artist")
    }

    pub fn credit(&self) -> Option<&str> {
        self.get("Credit")
    }

    pub fn license_short_name(&self) -> Option<&str> {
        self.get("LicenseShortName")
    }

    pub fn image_description(&self) -> Option<&str> {
        self.get("ImageDescription")
    }

    pub fn object_name(&self) -> Option<&str> {
        self.get("ObjectName")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RightsMetadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A prospective illustration match for a Latin name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    /// File title including the namespace marker (`File:...`).
    pub title: String,
    /// Direct download URL, required before the file can be saved.
    pub url: Option<String>,
    pub rights: RightsMetadata,
}

impl MediaCandidate {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            rights: RightsMetadata::new(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_rights(mut self, rights: RightsMetadata) -> Self {
        self.rights = rights;
        self
    }
}

/// File extension (with leading dot) of the last path segment of `url`,
/// or `.jpg` when there is none.
pub fn url_file_extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[idx..],
        _ => ".jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rights_accessors() {
        let rights = RightsMetadata::new()
            .with("Artist", "<a>Anton Hartinger</a>")
            .with("LicenseShortName", "Public domain");

        assert_eq!(rights.artist(), Some("<a>Anton Hartinger</a>"));
        assert_eq!(rights.license_short_name(), Some("Public domain"));
        assert!(rights.credit().is_none());
        assert!(!rights.is_empty());
    }

    #[test]
    fn test_media_candidate_builder() {
        let candidate = MediaCandidate::new("File:Atlas der Alpenflora Gentiana verna.jpg")
            .with_url("https://upload.wikimedia.org/a/ab/Gentiana.jpg");
        assert!(candidate.title.starts_with("File:"));
        assert!(candidate.url.is_some());
        assert!(candidate.rights.is_empty());
    }

    #[test]
    fn test_url_file_extension() {
        assert_eq!(
            url_file_extension("https://upload.wikimedia.org/x/Gentiana_verna.jpeg"),
            ".jpeg"
        );
        assert_eq!(
            url_file_extension("https://example.org/plate.png?download=1"),
            ".png"
        );
        assert_eq!(url_file_extension("https://example.org/plate"), ".jpg");
        assert_eq!(url_file_extension("https://example.org/.hidden"), ".jpg");
    }
}
