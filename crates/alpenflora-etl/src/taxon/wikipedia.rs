//! Wikipedia REST summary client.

use alpenflora_core::model::Language;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::config::{Config, Endpoints};
use crate::error::{EnrichError, EnrichResult};
use crate::http;
use crate::resilience::RateLimiter;
use crate::taxon::SummarySource;

const SOURCE: &str = "Wikipedia";

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
}

/// Fetches page summaries (`/page/summary/{title}`) from the language
/// editions of Wikipedia.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: Client,
    rate_limiter: RateLimiter,
    endpoints: Endpoints,
}

impl WikipediaClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http.timeout())?,
            rate_limiter: RateLimiter::new(config.http.requests_per_second),
            endpoints: config.endpoints.clone(),
        })
    }

    fn summary_url(&self, lang: Language, title: &str) -> EnrichResult<Url> {
        let base = self.endpoints.wikipedia_for(lang);
        let mut url = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| EnrichError::Endpoint(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| EnrichError::Endpoint(base.clone()))?
            .extend(["page", "summary", title]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl SummarySource for WikipediaClient {
    async fn summary(&self, lang: Language, title: &str) -> EnrichResult<Option<String>> {
        let url = self.summary_url(lang, title)?;
        self.rate_limiter.acquire().await;
        log::debug!("Fetching {} summary for {:?}", lang, title);

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            log::debug!("No {} page titled {:?}", lang, title);
            return Ok(None);
        }
        let response = http::ensure_success(response, SOURCE)?;
        let body: SummaryResponse = http::parse_json(response, SOURCE).await?;
        Ok(Some(body.extract.unwrap_or_default()))
    }
}
