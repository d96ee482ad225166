//! Taxon resolution: from a Latin name to a multilingual [`FlowerRecord`].
//!
//! The pipeline talks to two remote collaborators through the traits
//! below, so the walk, label and assembly logic can be exercised against
//! in-memory fakes.
//!
//! [`FlowerRecord`]: alpenflora_core::model::FlowerRecord

pub mod labels;
pub mod resolver;
pub mod walker;
pub mod wikidata;
pub mod wikipedia;

use alpenflora_core::model::{EntityId, Language, TaxonEntity, TaxonMatch};

use crate::error::EnrichResult;

/// Read-only access to the taxonomic knowledge graph.
#[async_trait::async_trait]
pub trait TaxonGraph: Send + Sync {
    /// Every entity whose taxon name is exactly `latin`, in result order.
    ///
    /// An empty `Vec` is a valid "not found".
    async fn find_by_taxon_name(&self, latin: &str) -> EnrichResult<Vec<TaxonMatch>>;

    /// Fetch one entity with its rank, name, parent, labels and sitelinks.
    async fn fetch_entity(&self, id: &EntityId) -> EnrichResult<TaxonEntity>;
}

/// Prose summaries from a per-language encyclopedia.
#[async_trait::async_trait]
pub trait SummarySource: Send + Sync {
    /// Summary of the page titled `title`, or `None` when there is no
    /// such page.
    async fn summary(&self, lang: Language, title: &str) -> EnrichResult<Option<String>>;
}
