//! Finds the plate file for one Latin name.

use alpenflora_core::model::MediaCandidate;

use crate::config::{Config, PlateConfig};
use crate::error::EnrichResult;
use crate::plate::commons::CommonsClient;
use crate::plate::MediaRepository;

/// How plate titles are guessed and searched for.
#[derive(Debug, Clone)]
pub struct PlateSettings {
    /// File name with a `{latin}` placeholder.
    pub title_template: String,
    pub search_keywords: String,
    pub search_limit: u32,
    pub namespace: String,
}

impl Default for PlateSettings {
    fn default() -> Self {
        Self::from_config(&PlateConfig::default())
    }
}

impl PlateSettings {
    pub fn from_config(config: &PlateConfig) -> Self {
        Self {
            title_template: config.title_template.clone(),
            search_keywords: config.search_keywords.clone(),
            search_limit: config.search_limit,
            namespace: config.namespace.clone(),
        }
    }
}

/// Exact-title lookup with a full-text search fallback.
#[derive(Debug)]
pub struct PlateResolver<R> {
    repository: R,
    settings: PlateSettings,
}

impl PlateResolver<CommonsClient> {
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self::new(
            CommonsClient::from_config(config)?,
            PlateSettings::from_config(&config.plates),
        ))
    }
}

impl<R: MediaRepository> PlateResolver<R> {
    pub fn new(repository: R, settings: PlateSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Exact titles to try, the name as given first and then its
    /// underscored spelling when that differs.
    pub fn candidate_titles(&self, latin: &str) -> Vec<String> {
        let mut titles = Vec::with_capacity(2);
        for variant in [latin.to_string(), latin.replace(' ', "_")] {
            let title = format!(
                "{}{}",
                self.settings.namespace,
                self.settings.title_template.replace("{latin}", &variant)
            );
            if !titles.contains(&title) {
                titles.push(title);
            }
        }
        titles
    }

    /// Full-text query used when no exact title resolves.
    pub fn search_phrase(&self, latin: &str) -> String {
        format!(r#"intitle:"{}" {}"#, self.settings.search_keywords, latin)
    }

    /// The first file that resolves to image info, or `Ok(None)`.
    pub async fn resolve(&self, latin: &str) -> EnrichResult<Option<MediaCandidate>> {
        for title in self.candidate_titles(latin) {
            if let Some(candidate) = self.repository.image_info(&title).await? {
                log::debug!("{:?} resolved to {}", latin, candidate.title);
                return Ok(Some(candidate));
            }
        }

        let hits = self
            .repository
            .search_files(&self.search_phrase(latin), self.settings.search_limit)
            .await?;
        log::debug!("{} search hit(s) for {:?}", hits.len(), latin);
        for title in hits {
            if let Some(candidate) = self.repository.image_info(&title).await? {
                log::debug!("{:?} resolved by search to {}", latin, candidate.title);
                return Ok(Some(candidate));
            }
        }

        log::info!("No plate found for {:?}", latin);
        Ok(None)
    }
}
