use serde::{Deserialize, Serialize};

/// One illustration harvested from a category scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateEntry {
    /// File title, unique within a scan.
    pub title: String,
    /// Inferred Latin name; `None` when nothing matched.
    pub latin_name: Option<String>,
    /// Category the file was listed in (without the `Category:` prefix).
    pub source_category: String,
}

impl PlateEntry {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        latin_name: Option<String>,
        source_category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            latin_name,
            source_category: source_category.into(),
        }
    }
}

/// File title without its namespace prefix and extension:
/// `File:Atlas - Gentiana_verna.jpg` becomes `Atlas - Gentiana_verna`.
pub fn title_basename(title: &str) -> &str {
    let base = title.split_once(':').map_or(title, |(_, rest)| rest);
    base.rsplit_once('.').map_or(base, |(stem, _)| stem)
}
