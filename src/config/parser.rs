use crate::config::types::{ClientConfig, ClientSection, Config, ConfigFile};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

/// Loads a configuration file and overlays it on the built-in defaults
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use michelin_my_maps::config::load_config;
///
/// let config = load_config(Path::new("mym.toml")).unwrap();
/// println!("Database: {}", config.database.path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses TOML text into a validated configuration
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(content)?;
    let config = apply_overrides(Config::default(), file);
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be traced back to the settings it used.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

fn apply_overrides(mut config: Config, file: ConfigFile) -> Config {
    if let Some(database) = file.database {
        if let Some(path) = database.path {
            config.database.path = path;
        }
    }

    if let Some(scrape) = file.scrape {
        apply_client(&mut config.scrape.client, scrape.client);
        if let Some(seeds) = scrape.seed_urls {
            config.scrape.seed_urls = seeds;
        }
    }

    if let Some(backfill) = file.backfill {
        apply_client(&mut config.backfill.client, backfill.client);
        if let Some(endpoint) = backfill.cdx_endpoint {
            config.backfill.cdx_endpoint = endpoint;
        }
        if let Some(base) = backfill.snapshot_base {
            config.backfill.snapshot_base = base;
        }
    }

    config
}

fn apply_client(client: &mut ClientConfig, section: ClientSection) {
    if let Some(v) = section.cache_path {
        client.cache_path = v;
    }
    if let Some(v) = section.allowed_domains {
        client.allowed_domains = v;
    }
    if let Some(v) = section.delay_ms {
        client.delay = Duration::from_millis(v);
    }
    if let Some(v) = section.random_delay_ms {
        client.random_delay = Duration::from_millis(v);
    }
    if let Some(v) = section.worker_count {
        client.worker_count = v;
    }
    if let Some(v) = section.max_queued_urls {
        client.max_queued_urls = v;
    }
    if let Some(v) = section.max_retry {
        client.max_retry = v;
    }
    if let Some(v) = section.permanent_statuses {
        client.permanent_statuses = v;
    }
    if let Some(v) = section.request_timeout_secs {
        client.request_timeout = Duration::from_secs(v);
    }
}
