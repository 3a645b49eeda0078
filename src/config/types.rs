use serde::Deserialize;
use std::time::Duration;

/// Live listing pages, one per distinction
pub const DEFAULT_SEED_URLS: &[&str] = &[
    "https://guide.michelin.com/en/restaurants/3-stars-michelin",
    "https://guide.michelin.com/en/restaurants/2-stars-michelin",
    "https://guide.michelin.com/en/restaurants/1-star-michelin",
    "https://guide.michelin.com/en/restaurants/bib-gourmand",
    "https://guide.michelin.com/en/restaurants/the-plate-michelin",
];

pub const DEFAULT_CDX_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";
pub const DEFAULT_SNAPSHOT_BASE: &str = "https://web.archive.org/web";
pub const DEFAULT_DATABASE_PATH: &str = "data/michelin.db";

/// Resolved configuration threaded from the entrypoint into every component
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scrape: ScrapeConfig,
    pub backfill: BackfillConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: DEFAULT_DATABASE_PATH.to_string(),
            },
            scrape: ScrapeConfig::default(),
            backfill: BackfillConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Settings for one HTTP client instance (cache, queue, workers, politeness)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory holding the response cache
    pub cache_path: String,

    /// Hosts that may be fetched; `*.example.com` also matches subdomains
    pub allowed_domains: Vec<String>,

    /// Fixed delay between two requests to the same host
    pub delay: Duration,

    /// Upper bound of the uniform jitter added to `delay`
    pub random_delay: Duration,

    pub worker_count: usize,
    pub max_queued_urls: usize,

    /// Attempts allowed per request, the first fetch included
    pub max_retry: u32,

    /// Status codes that are never retried
    pub permanent_statuses: Vec<u16>,

    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Client defaults for the live guide.michelin.com crawl
    pub fn scrape_defaults() -> Self {
        Self {
            cache_path: "cache/scrape".to_string(),
            allowed_domains: vec!["guide.michelin.com".to_string()],
            delay: Duration::from_secs(2),
            random_delay: Duration::from_secs(2),
            worker_count: 1,
            max_queued_urls: 30_000,
            max_retry: 3,
            permanent_statuses: vec![401, 403, 404],
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Client defaults for the Wayback Machine crawl
    pub fn backfill_defaults() -> Self {
        Self {
            cache_path: "cache/wayback".to_string(),
            allowed_domains: vec!["web.archive.org".to_string()],
            delay: Duration::from_secs(1),
            random_delay: Duration::from_secs(2),
            worker_count: 3,
            max_queued_urls: 300_000,
            max_retry: 3,
            permanent_statuses: vec![401, 403, 404],
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub client: ClientConfig,
    pub seed_urls: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::scrape_defaults(),
            seed_urls: DEFAULT_SEED_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub client: ClientConfig,

    /// CDX search endpoint, without query string
    pub cdx_endpoint: String,

    /// Prefix of snapshot URLs; `<base>/<timestamp>id_/<original>`
    pub snapshot_base: String,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::backfill_defaults(),
            cdx_endpoint: DEFAULT_CDX_ENDPOINT.to_string(),
            snapshot_base: DEFAULT_SNAPSHOT_BASE.to_string(),
        }
    }
}

/// On-disk TOML layout. Every key is optional and overlays the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    #[serde(default)]
    pub scrape: Option<ScrapeSection>,
    #[serde(default)]
    pub backfill: Option<BackfillSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientSection {
    pub cache_path: Option<String>,
    pub allowed_domains: Option<Vec<String>>,
    pub delay_ms: Option<u64>,
    pub random_delay_ms: Option<u64>,
    pub worker_count: Option<usize>,
    pub max_queued_urls: Option<usize>,
    pub max_retry: Option<u32>,
    pub permanent_statuses: Option<Vec<u16>>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScrapeSection {
    #[serde(flatten)]
    pub client: ClientSection,
    pub seed_urls: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackfillSection {
    #[serde(flatten)]
    pub client: ClientSection,
    pub cdx_endpoint: Option<String>,
    pub snapshot_base: Option<String>,
}
