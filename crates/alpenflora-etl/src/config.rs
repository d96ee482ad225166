use std::path::{Path, PathBuf};
use std::time::Duration;

use alpenflora_core::model::{Language, TaxonRank};
use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};

/// Configuration for alpenflora.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (ALPEN_* prefix)
/// 3. Config file (~/.config/alpenflora/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User-Agent sent to every Wikimedia endpoint.
    ///
    /// Can be set via:
    /// - ENV: ALPEN_USER_AGENT
    /// - Config: user_agent = "..."
    pub user_agent: String,

    /// Directory holding harvest and batch output.
    ///
    /// Default: ~/.local/share/alpenflora
    pub data_dir: PathBuf,

    /// Asset catalog that receives plate images.
    pub assets_dir: PathBuf,

    pub endpoints: Endpoints,
    pub taxonomy: TaxonomyConfig,
    pub plates: PlateConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Remote endpoints. Tests point these at local mock servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub wikidata_sparql: String,
    /// Base of `Special:EntityData`; `/{id}.json` is appended.
    pub wikidata_entity: String,
    /// Wikipedia REST base; `{lang}` is replaced by the language code.
    pub wikipedia: String,
    pub commons_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wikidata_sparql: "https://query.wikidata.org/sparql".to_string(),
            wikidata_entity: "https://www.wikidata.org/wiki/Special:EntityData".to_string(),
            wikipedia: "https://{lang}.wikipedia.org/api/rest_v1".to_string(),
            commons_api: "https://commons.wikimedia.org/w/api.php".to_string(),
        }
    }
}

impl Endpoints {
    /// Wikipedia REST base for one language.
    pub fn wikipedia_for(&self, lang: Language) -> String {
        self.wikipedia.replace("{lang}", lang.code())
    }
}

/// Wikidata items that identify the taxon ranks we care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankIds {
    pub species: String,
    pub subspecies: String,
    pub genus: String,
    pub family: String,
}

impl Default for RankIds {
    fn default() -> Self {
        Self {
            species: "Q7432".to_string(),
            subspecies: "Q68947".to_string(),
            genus: "Q34740".to_string(),
            family: "Q35409".to_string(),
        }
    }
}

impl RankIds {
    /// Map a rank item (if any) onto a [`TaxonRank`].
    pub fn classify(&self, rank_id: Option<&str>) -> TaxonRank {
        match rank_id {
            None => TaxonRank::Unranked,
            Some(id) if id == self.species => TaxonRank::Species,
            Some(id) if id == self.subspecies => TaxonRank::Subspecies,
            Some(id) if id == self.genus => TaxonRank::Genus,
            Some(id) if id == self.family => TaxonRank::Family,
            Some(_) => TaxonRank::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub ranks: RankIds,
    /// Language codes (or names) a record is localized into.
    pub languages: Vec<String>,
    /// Sentences kept from each summary.
    pub summary_sentences: usize,
    /// Maximum number of taxa examined when walking up to a rank.
    pub max_hops: usize,
    pub hop_pause_ms: u64,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            ranks: RankIds::default(),
            languages: Language::DEFAULTS
                .iter()
                .map(|lang| lang.code().to_string())
                .collect(),
            summary_sentences: 2,
            max_hops: 10,
            hop_pause_ms: 100,
        }
    }
}

impl TaxonomyConfig {
    /// Parse the configured languages, rejecting unknown codes.
    pub fn languages(&self) -> alpenflora_core::Result<Vec<Language>> {
        self.languages.iter().map(|code| code.parse()).collect()
    }

    pub fn hop_pause(&self) -> Duration {
        Duration::from_millis(self.hop_pause_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// File name template; `{latin}` is replaced by the Latin name.
    pub title_template: String,
    /// Phrase the search fallback requires in the file title.
    pub search_keywords: String,
    pub search_limit: u32,
    /// Namespace prefix of media files.
    pub namespace: String,
    /// Categories scanned by `harvest` (without the `Category:` prefix).
    pub categories: Vec<String>,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            title_template: "Atlas der Alpenflora {latin}.jpg".to_string(),
            search_keywords: "Atlas der Alpenflora".to_string(),
            search_limit: 10,
            namespace: "File:".to_string(),
            categories: (1..=4)
                .map(|volume| format!("Atlas der Alpenflora, Volume {volume}"))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub download_timeout_secs: u64,
    /// Per-client request budget.
    pub requests_per_second: u32,
    /// Pause between names in a batch run.
    pub batch_pause_ms: u64,
    /// Total attempts for one image download.
    pub download_attempts: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            download_timeout_secs: 60,
            requests_per_second: 10,
            batch_pause_ms: 200,
            download_attempts: 3,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
    pub coloured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            coloured: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            data_dir: default_data_dir(),
            assets_dir: PathBuf::from("AlpenBlumen/assets/Assets.xcassets"),
            endpoints: Endpoints::default(),
            taxonomy: TaxonomyConfig::default(),
            plates: PlateConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/alpenflora/config.toml
    /// Reads environment variables with ALPEN_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration using `config_path` instead of the default file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("alpen");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Default output of `harvest`, and seed of `batch`.
    pub fn harvest_path(&self) -> PathBuf {
        self.data_dir.join("hartinger.json")
    }

    /// Default output of `batch`.
    pub fn batch_output_path(&self) -> PathBuf {
        self.data_dir.join("AlpenBlumen.json")
    }

    /// Default file single lookups are appended to.
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }

    /// Look up a setting by dotted key (`taxonomy.max_hops`).
    pub fn get(&self, key: &str) -> Result<String> {
        let mut value = toml::Value::try_from(self).context("Failed to serialize config")?;
        for part in key.split('.') {
            value = value
                .get(part)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown config key: {key}"))?;
        }
        Ok(match value {
            toml::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with every endpoint under `base` and no pacing.
    pub(crate) fn for_mock_server(base: &str) -> Self {
        let mut config = Self::default();
        config.endpoints = Endpoints {
            wikidata_sparql: format!("{base}/sparql"),
            wikidata_entity: format!("{base}/entity"),
            wikipedia: format!("{base}/{{lang}}/api/rest_v1"),
            commons_api: format!("{base}/w/api.php"),
        };
        config.taxonomy.hop_pause_ms = 0;
        config.http.requests_per_second = 1000;
        config.http.batch_pause_ms = 0;
        config
    }
}

fn default_user_agent() -> String {
    "alpenflora/0.1.0 (https://github.com/oxur/alpenflora)".to_string()
}

/// Get the default data directory.
///
/// Returns: ~/.local/share/alpenflora (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alpenflora")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/alpenflora/config.toml
/// - macOS: ~/Library/Application Support/alpenflora/config.toml
/// - Windows: %APPDATA%\alpenflora\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alpenflora")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Alpenflora Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (ALPEN_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# User-Agent sent to Wikidata, Wikipedia and Wikimedia Commons.
# Wikimedia asks for a contact URL or address.
#user_agent = "alpenflora/0.1.0 (https://github.com/oxur/alpenflora)"

# Where harvest and batch output is written
#data_dir = "/path/to/data"

# Asset catalog that receives plate images
#assets_dir = "AlpenBlumen/assets/Assets.xcassets"

[taxonomy]
# Languages a record is localized into (en, de, fr, it)
languages = ["en", "de", "fr"]
# Sentences kept from each Wikipedia summary
summary_sentences = 2
# Taxa examined when walking up to genus/family
max_hops = 10
hop_pause_ms = 100

[plates]
title_template = "Atlas der Alpenflora {latin}.jpg"
search_keywords = "Atlas der Alpenflora"
search_limit = 10
categories = [
    "Atlas der Alpenflora, Volume 1",
    "Atlas der Alpenflora, Volume 2",
    "Atlas der Alpenflora, Volume 3",
    "Atlas der Alpenflora, Volume 4",
]

[http]
timeout_secs = 30
download_timeout_secs = 60
requests_per_second = 10
batch_pause_ms = 200
download_attempts = 3

[logging]
level = "info"
coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

/// Set a dotted key in the config file at `path`, keeping its comments.
///
/// Integers and booleans are stored as such, everything else as a string.
/// The edited document must still deserialize into a [`Config`].
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let contents = if path.exists() {
        std::fs::read_to_string(path).context("Failed to read config file")?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = contents.parse().context("Failed to parse config file")?;

    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, tables)) = parts.split_last() else {
        anyhow::bail!("Empty config key");
    };

    let mut table = doc.as_table_mut();
    for name in tables {
        let entry = table
            .entry(name)
            .or_insert_with(|| toml_edit::Item::Table(toml_edit::Table::new()));
        table = entry
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Config key {name} is not a table"))?;
    }
    table.insert(leaf, toml_edit::value(parse_scalar(value)));

    let rendered = doc.to_string();
    toml::from_str::<Config>(&rendered)
        .with_context(|| format!("Invalid value for {key}: {value}"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    std::fs::write(path, rendered).context("Failed to write config file")?;
    Ok(())
}

fn parse_scalar(value: &str) -> toml_edit::Value {
    if let Ok(n) = value.parse::<i64>() {
        return n.into();
    }
    if let Ok(b) = value.parse::<bool>() {
        return b.into();
    }
    value.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.data_dir.as_os_str().is_empty());
        assert_eq!(config.taxonomy.max_hops, 10);
        assert_eq!(config.taxonomy.summary_sentences, 2);
        assert_eq!(config.plates.search_limit, 10);
        assert_eq!(config.plates.categories.len(), 4);
        assert_eq!(config.plates.categories[0], "Atlas der Alpenflora, Volume 1");
    }

    #[test]
    fn test_default_languages_parse() {
        let langs = Config::default().taxonomy.languages().unwrap();
        assert_eq!(
            langs,
            vec![Language::English, Language::German, Language::French]
        );
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let mut config = Config::default();
        config.taxonomy.languages.push("tlh".to_string());
        assert!(config.taxonomy.languages().is_err());
    }

    #[test]
    fn test_rank_classification() {
        let ranks = RankIds::default();
        assert_eq!(ranks.classify(Some("Q7432")), TaxonRank::Species);
        assert_eq!(ranks.classify(Some("Q68947")), TaxonRank::Subspecies);
        assert_eq!(ranks.classify(Some("Q34740")), TaxonRank::Genus);
        assert_eq!(ranks.classify(Some("Q35409")), TaxonRank::Family);
        assert_eq!(ranks.classify(Some("Q36602")), TaxonRank::Other);
        assert_eq!(ranks.classify(None), TaxonRank::Unranked);
    }

    #[test]
    fn test_wikipedia_endpoint_per_language() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.wikipedia_for(Language::German),
            "https://de.wikipedia.org/api/rest_v1"
        );
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.plates.title_template, "Atlas der Alpenflora {latin}.jpg");
        assert_eq!(config.http.download_attempts, 3);
    }

    #[test]
    fn test_get_dotted_key() {
        let config = Config::default();
        assert_eq!(config.get("taxonomy.max_hops").unwrap(), "10");
        assert_eq!(config.get("plates.namespace").unwrap(), "File:");
        assert!(config.get("taxonomy.nope").is_err());
    }

    #[test]
    fn test_set_value_preserves_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, example_config()).unwrap();

        set_value(&path, "taxonomy.summary_sentences", "3").unwrap();
        set_value(&path, "user_agent", "flora-test/1.0").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Alpenflora Configuration File"));
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.taxonomy.summary_sentences, 3);
        assert_eq!(config.user_agent, "flora-test/1.0");
    }

    #[test]
    fn test_set_value_rejects_wrong_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set_value(&path, "taxonomy.max_hops", "many").is_err());
        assert!(!path.exists());
    }
}
