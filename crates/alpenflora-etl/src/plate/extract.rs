//! Latin names from plate titles and description metadata.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use alpenflora_core::model::{title_basename, RightsMetadata};
use regex::Regex;

#[allow(clippy::expect_used)]
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid regex"));

#[allow(clippy::expect_used)]
static NBSP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&nbsp;?").expect("valid regex"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[allow(clippy::expect_used)]
static ITALICS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<i>([^<]+)</i>").expect("valid regex"));

#[allow(clippy::expect_used)]
static BINOMIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[a-z]{2,}))\b").expect("valid regex"));

/// Titles with a digit are title pages, indexes and numbered scans, not
/// species plates.
pub fn is_auxiliary_title(title: &str) -> bool {
    DIGIT.is_match(title)
}

/// Replace `&nbsp` entities, collapse whitespace and trim.
pub fn clean_latin_name(name: &str) -> Option<String> {
    let name = NBSP.replace_all(name, " ");
    let name = WHITESPACE.replace_all(&name, " ");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Last `-`-separated segment of the title's basename, underscores read as
/// spaces: `File:Hartinger - Atlas - Gentiana_verna.jpg` gives
/// `Gentiana verna`.
pub fn latin_from_title(title: &str) -> Option<String> {
    let last = title_basename(title)
        .split('-')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .next_back()?;
    clean_latin_name(&last.replace('_', " "))
}

/// Candidates from the description and object name: italic spans and
/// anything shaped like a binomial.
pub fn latin_from_metadata(rights: &RightsMetadata) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for text in [rights.image_description(), rights.object_name()]
        .into_iter()
        .flatten()
        .filter(|text| !text.is_empty())
    {
        for caps in ITALICS.captures_iter(text) {
            names.extend(clean_latin_name(&caps[1]));
        }
        for caps in BINOMIAL.captures_iter(text) {
            names.extend(clean_latin_name(&caps[1]));
        }
    }
    names
}

/// The lexicographically smallest candidate from metadata and title.
pub fn choose_latin_name(title: &str, rights: Option<&RightsMetadata>) -> Option<String> {
    let mut candidates = rights.map(latin_from_metadata).unwrap_or_default();
    candidates.extend(latin_from_title(title));
    candidates.into_iter().next()
}
