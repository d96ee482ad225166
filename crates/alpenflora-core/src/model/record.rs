use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Language;

/// One language's view of a taxon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedEntry {
    /// Display name; never empty (the Latin name is the last fallback).
    pub name: String,
    /// Short prose summary, possibly empty.
    pub description: String,
}

impl LocalizedEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The assembled multilingual botanical record for one Latin name.
///
/// Serializes as
/// `{"english": {..}, "german": {..}, "french": {..}, "latin": .., "family": .., "genus": ..}`
/// with the language entries in [`Language`] declaration order, so two
/// records built from the same data serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerRecord {
    #[serde(flatten)]
    entries: BTreeMap<Language, LocalizedEntry>,
    latin: String,
    family: String,
    genus: String,
}

impl FlowerRecord {
    #[must_use]
    pub fn new(
        latin: impl Into<String>,
        family: impl Into<String>,
        genus: impl Into<String>,
        entries: impl IntoIterator<Item = (Language, LocalizedEntry)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            latin: latin.into(),
            family: family.into(),
            genus: genus.into(),
        }
    }

    pub fn latin(&self) -> &str {
        &self.latin
    }

    /// Latin family name, empty when unknown.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Latin genus name, empty when unknown.
    pub fn genus(&self) -> &str {
        &self.genus
    }

    pub fn entry(&self, lang: Language) -> Option<&LocalizedEntry> {
        self.entries.get(&lang)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Language, &LocalizedEntry)> {
        self.entries.iter().map(|(lang, entry)| (*lang, entry))
    }
}
