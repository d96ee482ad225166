use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of an entity in the knowledge graph (e.g. `Q12345`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an identifier from an entity URI by keeping its last path
    /// segment (`http://www.wikidata.org/entity/Q42` becomes `Q42`).
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        Self(uri.rsplit('/').next().unwrap_or(uri).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Classification level of a taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonRank {
    Species,
    Subspecies,
    Genus,
    Family,
    /// A rank we do not distinguish (order, variety, ...).
    Other,
    /// No rank statement at all.
    Unranked,
}

impl TaxonRank {
    /// Ordering key used when several entities share a taxon name; lower
    /// wins.
    #[must_use]
    pub const fn selection_priority(self) -> u8 {
        match self {
            Self::Species => 0,
            Self::Subspecies => 1,
            Self::Genus | Self::Family | Self::Other => 5,
            Self::Unranked => 10,
        }
    }
}

/// One row of a taxon-name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonMatch {
    pub id: EntityId,
    pub rank: TaxonRank,
}

impl TaxonMatch {
    #[must_use]
    pub fn new(id: impl Into<EntityId>, rank: TaxonRank) -> Self {
        Self {
            id: id.into(),
            rank,
        }
    }
}

/// A taxon node as fetched from the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonEntity {
    pub id: EntityId,
    pub rank: TaxonRank,
    /// Latin taxon name, when the entity states one.
    pub taxon_name: Option<String>,
    /// Parent taxon; the walk only ever moves along this link.
    pub parent: Option<EntityId>,
    /// Language code to label.
    pub labels: BTreeMap<String, String>,
    /// Wiki key (`enwiki`) to page title.
    pub sitelinks: BTreeMap<String, String>,
}

impl TaxonEntity {
    #[must_use]
    pub fn new(id: impl Into<EntityId>, rank: TaxonRank) -> Self {
        Self {
            id: id.into(),
            rank,
            taxon_name: None,
            parent: None,
            labels: BTreeMap::new(),
            sitelinks: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_taxon_name(mut self, name: impl Into<String>) -> Self {
        self.taxon_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<EntityId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    #[must_use]
    pub fn with_sitelink(mut self, wiki: impl Into<String>, title: impl Into<String>) -> Self {
        self.sitelinks.insert(wiki.into(), title.into());
        self
    }

    pub fn label(&self, lang: &str) -> Option<&str> {
        self.labels.get(lang).map(String::as_str)
    }

    pub fn sitelink(&self, wiki: &str) -> Option<&str> {
        self.sitelinks.get(wiki).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_from_uri() {
        let id = EntityId::from_uri("http://www.wikidata.org/entity/Q157947");
        assert_eq!(id.as_str(), "Q157947");
        assert_eq!(EntityId::from_uri("Q1").as_str(), "Q1");
    }

    #[test]
    fn test_rank_priority_prefers_species() {
        assert!(
            TaxonRank::Species.selection_priority() < TaxonRank::Subspecies.selection_priority()
        );
        assert!(
            TaxonRank::Subspecies.selection_priority() < TaxonRank::Genus.selection_priority()
        );
        assert!(TaxonRank::Other.selection_priority() < TaxonRank::Unranked.selection_priority());
    }

    #[test]
    fn test_entity_builder() {
        let entity = TaxonEntity::new("Q1", TaxonRank::Species)
            .with_taxon_name("Gentiana verna")
            .with_parent("Q2")
            .with_label("de", "Frühlings-Enzian")
            .with_sitelink("enwiki", "Gentiana verna");

        assert_eq!(entity.taxon_name.as_deref(), Some("Gentiana verna"));
        assert_eq!(entity.parent, Some(EntityId::new("Q2")));
        assert_eq!(entity.label("de"), Some("Frühlings-Enzian"));
        assert_eq!(entity.sitelink("enwiki"), Some("Gentiana verna"));
        assert!(entity.label("fr").is_none());
    }
}
