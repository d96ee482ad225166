//! Wikidata knowledge-graph client.
//!
//! Queries the Wikidata SPARQL endpoint for entities carrying an exact
//! taxon name and fetches entity documents from `Special:EntityData` to
//! read rank, Latin name, parent taxon, labels and sitelinks.

use std::collections::HashMap;

use alpenflora_core::model::{EntityId, TaxonEntity, TaxonMatch};
use reqwest::Client;
use serde::Deserialize;

use crate::config::{Config, RankIds};
use crate::error::{EnrichError, EnrichResult};
use crate::http;
use crate::resilience::RateLimiter;
use crate::taxon::TaxonGraph;

const SOURCE: &str = "Wikidata";

// ---------------------------------------------------------------------------
// Wikidata property IDs for taxa
// ---------------------------------------------------------------------------

/// Taxon name -- string value.
const PROP_TAXON_NAME: &str = "P225";

/// Taxon rank -- entity reference (e.g. Q7432 = "species").
const PROP_TAXON_RANK: &str = "P105";

/// Parent taxon -- entity reference.
const PROP_PARENT_TAXON: &str = "P171";

// ---------------------------------------------------------------------------
// SPARQL response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SparqlResult {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

// ---------------------------------------------------------------------------
// Entity data response types
// ---------------------------------------------------------------------------

/// Wrapper for the Wikidata `Special:EntityData` JSON response.
#[derive(Debug, Deserialize)]
struct EntityDataWrapper {
    entities: HashMap<String, WikidataEntity>,
}

/// A Wikidata entity with the parts a taxon needs.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataEntity {
    /// The QID of this entity (e.g. "Q157947").
    pub id: String,

    /// Property claims keyed by property ID (e.g. "P171").
    #[serde(default)]
    pub claims: HashMap<String, Vec<WikidataClaim>>,

    #[serde(default)]
    pub labels: HashMap<String, WikidataLabel>,

    #[serde(default)]
    pub sitelinks: HashMap<String, WikidataSitelink>,
}

/// A single claim (statement) on a Wikidata entity.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataClaim {
    pub mainsnak: WikidataSnak,
}

/// The snak inside a claim. `novalue`/`somevalue` snaks carry no
/// `datavalue`.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataSnak {
    pub datavalue: Option<ClaimValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikidataLabel {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikidataSitelink {
    pub title: String,
}

/// A claim value, decoded from Wikidata's `{"type": .., "value": ..}`
/// pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDataValue")]
pub enum ClaimValue {
    /// A plain string value.
    Literal(String),

    /// A reference to another Wikidata entity.
    EntityReference(String),

    /// Any other value type (time, quantity, monolingual text, ...).
    Other,
}

#[derive(Debug, Deserialize)]
struct RawDataValue {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl From<RawDataValue> for ClaimValue {
    fn from(raw: RawDataValue) -> Self {
        let decoded = match raw.kind.as_str() {
            "string" => raw.value.as_str().map(|s| Self::Literal(s.to_string())),
            "wikibase-entityid" => raw
                .value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(|id| Self::EntityReference(id.to_string())),
            _ => None,
        };
        decoded.unwrap_or(Self::Other)
    }
}

impl WikidataEntity {
    fn first_value(&self, property: &str) -> Option<&ClaimValue> {
        self.claims
            .get(property)?
            .first()?
            .mainsnak
            .datavalue
            .as_ref()
    }

    /// The first statement of `property`, if it is a string.
    pub fn first_string(&self, property: &str) -> Option<&str> {
        match self.first_value(property)? {
            ClaimValue::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// The first statement of `property`, if it is an entity reference.
    pub fn first_entity_ref(&self, property: &str) -> Option<&str> {
        match self.first_value(property)? {
            ClaimValue::EntityReference(id) => Some(id),
            _ => None,
        }
    }

    /// Convert into the domain model, classifying the rank with `ranks`.
    pub fn into_taxon(self, ranks: &RankIds) -> TaxonEntity {
        let mut taxon = TaxonEntity::new(
            self.id.as_str(),
            ranks.classify(self.first_entity_ref(PROP_TAXON_RANK)),
        );
        if let Some(name) = self.first_string(PROP_TAXON_NAME) {
            taxon = taxon.with_taxon_name(name);
        }
        if let Some(parent) = self.first_entity_ref(PROP_PARENT_TAXON) {
            taxon = taxon.with_parent(parent);
        }
        taxon.labels = self
            .labels
            .into_iter()
            .map(|(lang, label)| (lang, label.value))
            .collect();
        taxon.sitelinks = self
            .sitelinks
            .into_iter()
            .map(|(wiki, link)| (wiki, link.title))
            .collect();
        taxon
    }
}

/// Escape a value for use inside a double-quoted SPARQL literal.
fn sparql_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Wikidata SPARQL and entity-data client.
///
/// Wraps a `reqwest::Client` pre-configured with the project user-agent and
/// a per-source [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct WikidataClient {
    http: Client,
    rate_limiter: RateLimiter,
    sparql_url: String,
    entity_base: String,
    ranks: RankIds,
}

impl WikidataClient {
    /// Create a client for the endpoints and rank ids in `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http.timeout())?,
            rate_limiter: RateLimiter::new(config.http.requests_per_second),
            sparql_url: config.endpoints.wikidata_sparql.clone(),
            entity_base: config
                .endpoints
                .wikidata_entity
                .trim_end_matches('/')
                .to_string(),
            ranks: config.taxonomy.ranks.clone(),
        })
    }

    /// Fetch the raw entity document for a QID.
    ///
    /// # Errors
    /// Returns an error on HTTP failure, parse failure, or when the entity
    /// is not in the response.
    pub async fn get_entity(&self, qid: &str) -> EnrichResult<WikidataEntity> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/{}.json", self.entity_base, qid);
        log::debug!("Fetching Wikidata entity {}", qid);

        let response = self.http.get(&url).send().await?;
        let response = http::ensure_success(response, SOURCE)?;
        let mut wrapper: EntityDataWrapper = http::parse_json(response, SOURCE).await?;

        // Redirected items are keyed by their target id.
        let entity = match wrapper.entities.remove(qid) {
            Some(entity) => Some(entity),
            None => wrapper.entities.into_values().next(),
        };
        entity.ok_or(EnrichError::NotFound {
            entity: qid.to_string(),
            source_name: SOURCE.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl TaxonGraph for WikidataClient {
    async fn find_by_taxon_name(&self, latin: &str) -> EnrichResult<Vec<TaxonMatch>> {
        self.rate_limiter.acquire().await;

        let query = format!(
            r#"SELECT ?item ?rank WHERE {{ ?item wdt:{} "{}" . OPTIONAL {{ ?item wdt:{} ?rank . }} }}"#,
            PROP_TAXON_NAME,
            sparql_literal(latin),
            PROP_TAXON_RANK,
        );

        let response = self
            .http
            .get(&self.sparql_url)
            .query(&[("query", query.as_str()), ("format", "json")])
            .send()
            .await?;
        let response = http::ensure_success(response, SOURCE)?;
        let result: SparqlResult = http::parse_json(response, SOURCE).await?;

        let matches: Vec<TaxonMatch> = result
            .results
            .bindings
            .iter()
            .filter_map(|binding| {
                let item = binding.get("item")?;
                let rank_id = binding.get("rank").map(|r| EntityId::from_uri(&r.value));
                let rank = self.ranks.classify(rank_id.as_ref().map(EntityId::as_str));
                Some(TaxonMatch::new(EntityId::from_uri(&item.value), rank))
            })
            .collect();

        log::debug!("{} Wikidata match(es) for {:?}", matches.len(), latin);
        Ok(matches)
    }

    async fn fetch_entity(&self, id: &EntityId) -> EnrichResult<TaxonEntity> {
        let entity = self.get_entity(id.as_str()).await?;
        Ok(entity.into_taxon(&self.ranks))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
