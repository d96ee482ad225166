//! Assembles one [`FlowerRecord`] per Latin name.

use std::time::Duration;

use alpenflora_core::model::{FlowerRecord, Language, TaxonMatch, TaxonRank};

use crate::config::Config;
use crate::error::EnrichResult;
use crate::taxon::labels::localize;
use crate::taxon::walker::RankWalker;
use crate::taxon::wikidata::WikidataClient;
use crate::taxon::wikipedia::WikipediaClient;
use crate::taxon::{SummarySource, TaxonGraph};

/// Knobs for taxon resolution.
#[derive(Debug, Clone)]
pub struct TaxonSettings {
    /// Languages in the record, in output order.
    pub languages: Vec<Language>,
    pub summary_sentences: usize,
    pub max_hops: usize,
    pub hop_pause: Duration,
}

impl Default for TaxonSettings {
    fn default() -> Self {
        Self {
            languages: Language::DEFAULTS.to_vec(),
            summary_sentences: 2,
            max_hops: 10,
            hop_pause: Duration::from_millis(100),
        }
    }
}

impl TaxonSettings {
    pub fn from_config(config: &Config) -> alpenflora_core::Result<Self> {
        Ok(Self {
            languages: config.taxonomy.languages()?,
            summary_sentences: config.taxonomy.summary_sentences,
            max_hops: config.taxonomy.max_hops,
            hop_pause: config.taxonomy.hop_pause(),
        })
    }
}

/// The preferred match: species, then subspecies, then any other rank,
/// then unranked. The first row wins among equals.
pub fn select_best_match(matches: &[TaxonMatch]) -> Option<&TaxonMatch> {
    matches
        .iter()
        .min_by_key(|candidate| candidate.rank.selection_priority())
}

/// Resolves Latin names into multilingual records.
///
/// Holds no state between calls; resolving the same name twice against
/// unchanged remote data gives identical records. Remote failures are
/// returned as-is, the caller decides whether to skip or abort.
#[derive(Debug)]
pub struct TaxonResolver<G, S> {
    graph: G,
    summaries: S,
    settings: TaxonSettings,
}

impl TaxonResolver<WikidataClient, WikipediaClient> {
    /// Resolver backed by Wikidata and Wikipedia.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self::new(
            WikidataClient::from_config(config)?,
            WikipediaClient::from_config(config)?,
            TaxonSettings::from_config(config)?,
        ))
    }
}

impl<G: TaxonGraph, S: SummarySource> TaxonResolver<G, S> {
    pub fn new(graph: G, summaries: S, settings: TaxonSettings) -> Self {
        Self {
            graph,
            summaries,
            settings,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Resolve `latin` into a record, or `Ok(None)` when no taxon carries
    /// that name.
    pub async fn resolve(&self, latin: &str) -> EnrichResult<Option<FlowerRecord>> {
        let matches = self.graph.find_by_taxon_name(latin).await?;
        let Some(best) = select_best_match(&matches) else {
            log::info!("No taxon found for {:?}", latin);
            return Ok(None);
        };
        log::debug!(
            "Picked {} ({:?}) out of {} match(es) for {:?}",
            best.id,
            best.rank,
            matches.len(),
            latin
        );

        let entity = self.graph.fetch_entity(&best.id).await?;

        let walker = RankWalker::new(
            &self.graph,
            self.settings.max_hops,
            self.settings.hop_pause,
        );
        let genus = walker.walk_from(&entity, TaxonRank::Genus).await?;
        let family = walker.walk_from(&entity, TaxonRank::Family).await?;

        let mut entries = Vec::with_capacity(self.settings.languages.len());
        for &lang in &self.settings.languages {
            let entry = localize(
                &self.summaries,
                &entity,
                lang,
                latin,
                self.settings.summary_sentences,
            )
            .await;
            entries.push((lang, entry));
        }

        Ok(Some(FlowerRecord::new(
            latin,
            family.unwrap_or_default(),
            genus.unwrap_or_default(),
            entries,
        )))
    }
}
