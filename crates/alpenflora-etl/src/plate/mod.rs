//! Plate resolution: *Atlas der Alpenflora* illustrations on Wikimedia
//! Commons.
//!
//! [`resolver`] finds the plate for one Latin name, [`harvest`] scans the
//! atlas categories for every plate and its Latin name, and [`download`]
//! moves resolved files to disk.

pub mod attribution;
pub mod commons;
pub mod download;
pub mod extract;
pub mod harvest;
pub mod resolver;

use std::collections::HashMap;

use alpenflora_core::model::MediaCandidate;

use crate::error::EnrichResult;

/// Read-only access to a media repository.
#[async_trait::async_trait]
pub trait MediaRepository: Send + Sync {
    /// Image info for one exact file title.
    ///
    /// `None` when the page is missing or carries no image info.
    async fn image_info(&self, title: &str) -> EnrichResult<Option<MediaCandidate>>;

    /// Titles of files matching a full-text query, in rank order.
    async fn search_files(&self, query: &str, limit: u32) -> EnrichResult<Vec<String>>;

    /// Titles of every file in `category` (given without the `Category:`
    /// prefix), in listing order.
    async fn category_files(&self, category: &str) -> EnrichResult<Vec<String>>;

    /// Image info for many titles at once, keyed by title. Titles without
    /// image info are absent from the map.
    async fn image_infos(&self, titles: &[String]) -> EnrichResult<HashMap<String, MediaCandidate>>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// In-memory repository that counts searches and lookups.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRepository {
        pub(crate) files: HashMap<String, MediaCandidate>,
        pub(crate) search_hits: Vec<String>,
        pub(crate) categories: HashMap<String, Vec<String>>,
        pub(crate) lookups: AtomicUsize,
        pub(crate) searches: AtomicUsize,
    }

    impl FakeRepository {
        pub(crate) fn with_file(mut self, candidate: MediaCandidate) -> Self {
            self.files.insert(candidate.title.clone(), candidate);
            self
        }

        pub(crate) fn with_search_hits(mut self, hits: &[&str]) -> Self {
            self.search_hits = hits.iter().map(|hit| (*hit).to_string()).collect();
            self
        }

        pub(crate) fn with_category(mut self, name: &str, titles: &[&str]) -> Self {
            self.categories.insert(
                name.to_string(),
                titles.iter().map(|title| (*title).to_string()).collect(),
            );
            self
        }

        pub(crate) fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        pub(crate) fn searches(&self) -> usize {
            self.searches.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl MediaRepository for FakeRepository {
        async fn image_info(&self, title: &str) -> EnrichResult<Option<MediaCandidate>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.files.get(title).cloned())
        }

        async fn search_files(&self, _query: &str, limit: u32) -> EnrichResult<Vec<String>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .search_hits
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn category_files(&self, category: &str) -> EnrichResult<Vec<String>> {
            Ok(self.categories.get(category).cloned().unwrap_or_default())
        }

        async fn image_infos(
            &self,
            titles: &[String],
        ) -> EnrichResult<HashMap<String, MediaCandidate>> {
            Ok(titles
                .iter()
                .filter_map(|title| Some((title.clone(), self.files.get(title)?.clone())))
                .collect())
        }
    }
}
