//! Wikimedia Commons action-API client.
//!
//! All requests use `action=query` with `format=json&formatversion=2`:
//! `prop=imageinfo` for file metadata, `list=search` in the file namespace
//! for the search fallback, and `list=categorymembers` (following
//! `cmcontinue`) for category scans.

use std::collections::HashMap;

use alpenflora_core::model::{MediaCandidate, RightsMetadata};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{EnrichError, EnrichResult};
use crate::http;
use crate::plate::MediaRepository;
use crate::resilience::RateLimiter;

const SOURCE: &str = "Wikimedia Commons";

/// Titles per `prop=imageinfo` request.
const TITLES_PER_REQUEST: usize = 50;

/// Members per `list=categorymembers` page.
const CATEGORY_PAGE_SIZE: &str = "50";

/// File namespace id.
const FILE_NAMESPACE: &str = "6";

const IMAGE_PROPS: &str = "url|extmetadata";

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: QueryResult,
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    normalized: Vec<Normalization>,
    #[serde(default)]
    categorymembers: Vec<TitleHit>,
    #[serde(default)]
    search: Vec<TitleHit>,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    cmcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct Normalization {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct TitleHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: Option<String>,
    #[serde(default)]
    extmetadata: HashMap<String, ExtMetadataValue>,
}

#[derive(Debug, Deserialize)]
struct ExtMetadataValue {
    #[serde(default)]
    value: serde_json::Value,
}

impl ExtMetadataValue {
    fn into_text(self) -> String {
        match self.value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl Page {
    /// The first image-info record as a candidate; `None` for missing
    /// pages and pages without image info.
    fn into_candidate(self) -> Option<MediaCandidate> {
        if self.missing {
            return None;
        }
        let info = self.imageinfo.into_iter().next()?;
        let rights: RightsMetadata = info
            .extmetadata
            .into_iter()
            .map(|(key, value)| (key, value.into_text()))
            .collect();

        let mut candidate = MediaCandidate::new(self.title).with_rights(rights);
        candidate.url = info.url;
        Some(candidate)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Wikimedia Commons API client with a per-source [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct CommonsClient {
    http: Client,
    rate_limiter: RateLimiter,
    api_url: String,
}

impl CommonsClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http.timeout())?,
            rate_limiter: RateLimiter::new(config.http.requests_per_second),
            api_url: config.endpoints.commons_api.clone(),
        })
    }

    async fn query(&self, params: &[(&str, &str)]) -> EnrichResult<ApiResponse> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .query(params)
            .send()
            .await?;
        let response = http::ensure_success(response, SOURCE)?;
        let body: ApiResponse = http::parse_json(response, SOURCE).await?;

        if let Some(error) = body.error {
            return Err(EnrichError::Http {
                source_name: SOURCE.to_string(),
                message: format!("{}: {}", error.code, error.info),
            });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl MediaRepository for CommonsClient {
    async fn image_info(&self, title: &str) -> EnrichResult<Option<MediaCandidate>> {
        log::debug!("Looking up {:?}", title);
        let body = self
            .query(&[
                ("prop", "imageinfo"),
                ("iiprop", IMAGE_PROPS),
                ("titles", title),
            ])
            .await?;
        Ok(body
            .query
            .pages
            .into_iter()
            .next()
            .and_then(Page::into_candidate))
    }

    async fn search_files(&self, query: &str, limit: u32) -> EnrichResult<Vec<String>> {
        log::debug!("Searching Commons for {:?}", query);
        let limit = limit.to_string();
        let body = self
            .query(&[
                ("list", "search"),
                ("srnamespace", FILE_NAMESPACE),
                ("srlimit", limit.as_str()),
                ("srsearch", query),
            ])
            .await?;
        Ok(body.query.search.into_iter().map(|hit| hit.title).collect())
    }

    async fn category_files(&self, category: &str) -> EnrichResult<Vec<String>> {
        let cmtitle = if category.starts_with("Category:") {
            category.to_string()
        } else {
            format!("Category:{category}")
        };

        let mut titles = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut params = vec![
                ("list", "categorymembers"),
                ("cmtitle", cmtitle.as_str()),
                ("cmtype", "file"),
                ("cmlimit", CATEGORY_PAGE_SIZE),
            ];
            if let Some(token) = token.as_deref() {
                params.push(("cmcontinue", token));
            }
            let body = self.query(&params).await?;
            titles.extend(body.query.categorymembers.into_iter().map(|hit| hit.title));

            match body.continuation.and_then(|c| c.cmcontinue) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        log::debug!("{} file(s) in {}", titles.len(), cmtitle);
        Ok(titles)
    }

    async fn image_infos(&self, titles: &[String]) -> EnrichResult<HashMap<String, MediaCandidate>> {
        let mut found = HashMap::new();
        for chunk in titles.chunks(TITLES_PER_REQUEST) {
            let joined = chunk.join("|");
            let body = self
                .query(&[
                    ("prop", "imageinfo"),
                    ("iiprop", IMAGE_PROPS),
                    ("titles", joined.as_str()),
                ])
                .await?;

            let QueryResult {
                pages, normalized, ..
            } = body.query;
            for candidate in pages.into_iter().filter_map(Page::into_candidate) {
                found.insert(candidate.title.clone(), candidate);
            }
            // Requested spellings resolve to the normalized page.
            for alias in normalized {
                if let Some(candidate) = found.get(&alias.to).cloned() {
                    found.insert(alias.from, candidate);
                }
            }
        }
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> CommonsClient {
        CommonsClient::from_config(&Config::for_mock_server(&server.url())).unwrap()
    }

    const VERNA_INFO: &str = r#"{
        "batchcomplete": true,
        "query": {
            "pages": [
                {
                    "ns": 6,
                    "title": "File:Atlas der Alpenflora Gentiana verna.jpg",
                    "imageinfo": [
                        {
                            "url": "https://upload.wikimedia.org/a/ab/Gentiana_verna.jpg",
                            "extmetadata": {
                                "Artist": { "value": "<a href=\"x\">Anton Hartinger</a>", "source": "commons-desc-page" },
                                "LicenseShortName": { "value": "Public domain", "source": "commons-desc-page" },
                                "DateTime": { "value": 1882, "source": "mediawiki-metadata" }
                            }
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_missing_page_has_no_candidate() {
        let page: Page = serde_json::from_str(
            r#"{"ns": 6, "title": "File:Nope.jpg", "missing": true}"#,
        )
        .unwrap();
        assert!(page.into_candidate().is_none());

        let page: Page =
            serde_json::from_str(r#"{"ns": 6, "title": "File:Empty.jpg", "imageinfo": []}"#)
                .unwrap();
        assert!(page.into_candidate().is_none());
    }

    #[tokio::test]
    async fn test_image_info() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "query".into()),
                Matcher::UrlEncoded("formatversion".into(), "2".into()),
                Matcher::UrlEncoded("prop".into(), "imageinfo".into()),
                Matcher::UrlEncoded("iiprop".into(), "url|extmetadata".into()),
                Matcher::UrlEncoded(
                    "titles".into(),
                    "File:Atlas der Alpenflora Gentiana verna.jpg".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(VERNA_INFO)
            .create_async()
            .await;

        let candidate = client(&server)
            .image_info("File:Atlas der Alpenflora Gentiana verna.jpg")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            candidate.url.as_deref(),
            Some("https://upload.wikimedia.org/a/ab/Gentiana_verna.jpg")
        );
        assert_eq!(
            candidate.rights.artist(),
            Some("<a href=\"x\">Anton Hartinger</a>")
        );
        assert_eq!(candidate.rights.get("DateTime"), Some("1882"));
    }

    #[tokio::test]
    async fn test_image_info_missing_page() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"query": {"pages": [{"title": "File:X.jpg", "missing": true}]}}"#)
            .create_async()
            .await;

        let found = client(&server).image_info("File:X.jpg").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_search_files() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srnamespace".into(), "6".into()),
                Matcher::UrlEncoded("srlimit".into(), "10".into()),
                Matcher::UrlEncoded(
                    "srsearch".into(),
                    r#"intitle:"Atlas der Alpenflora" Gentiana verna"#.into(),
                ),
            ]))
            .with_status(200)
            .with_body(
                r#"{"query": {"search": [
                    {"ns": 6, "title": "File:Atlas der Alpenflora Gentiana verna L.jpg"},
                    {"ns": 6, "title": "File:Atlas der Alpenflora Gentiana.jpg"}
                ]}}"#,
            )
            .create_async()
            .await;

        let hits = client(&server)
            .search_files(r#"intitle:"Atlas der Alpenflora" Gentiana verna"#, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], "File:Atlas der Alpenflora Gentiana verna L.jpg");
    }

    #[tokio::test]
    async fn test_category_files_follows_continuation() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cmtitle".into(), "Category:Atlas der Alpenflora, Volume 1".into()),
                // the first page carries no continuation token
                Matcher::Regex("cmlimit=50$".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"continue": {"cmcontinue": "file|next", "continue": "-||"},
                    "query": {"categorymembers": [{"ns": 6, "title": "File:A.jpg"}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("cmcontinue".into(), "file|next".into()))
            .with_status(200)
            .with_body(r#"{"query": {"categorymembers": [{"ns": 6, "title": "File:B.jpg"}]}}"#)
            .expect(1)
            .create_async()
            .await;

        let titles = client(&server)
            .category_files("Atlas der Alpenflora, Volume 1")
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(titles, vec!["File:A.jpg", "File:B.jpg"]);
    }

    #[tokio::test]
    async fn test_image_infos_in_chunks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(VERNA_INFO)
            .expect(2)
            .create_async()
            .await;

        let titles: Vec<String> = (0..51).map(|i| format!("File:Plate {i}.jpg")).collect();
        let found = client(&server).image_infos(&titles).await.unwrap();

        mock.assert_async().await;
        assert!(found.contains_key("File:Atlas der Alpenflora Gentiana verna.jpg"));
    }

    #[tokio::test]
    async fn test_image_infos_maps_normalized_titles() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"query": {
                    "normalized": [{"fromencoded": false, "from": "File:Atlas_der_Alpenflora_Gentiana_verna.jpg", "to": "File:Atlas der Alpenflora Gentiana verna.jpg"}],
                    "pages": [{"title": "File:Atlas der Alpenflora Gentiana verna.jpg",
                               "imageinfo": [{"url": "https://upload.wikimedia.org/v.jpg"}]}]
                }}"#,
            )
            .create_async()
            .await;

        let found = client(&server)
            .image_infos(&["File:Atlas_der_Alpenflora_Gentiana_verna.jpg".to_string()])
            .await
            .unwrap();
        assert!(found.contains_key("File:Atlas_der_Alpenflora_Gentiana_verna.jpg"));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"code": "badvalue", "info": "Unrecognized value"}}"#)
            .create_async()
            .await;

        let err = client(&server).search_files("x", 10).await.unwrap_err();
        assert!(err.to_string().contains("badvalue"));
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let err = client(&server).image_info("File:X.jpg").await.unwrap_err();
        assert!(matches!(err, EnrichError::RateLimited { .. }));
    }
}
