use crate::config::types::{BackfillConfig, ClientConfig, Config, ScrapeConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.database.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }
    validate_scrape_config(&config.scrape)?;
    validate_backfill_config(&config.backfill)?;
    Ok(())
}

fn validate_scrape_config(config: &ScrapeConfig) -> ConfigResult<()> {
    validate_client_config("scrape", &config.client)?;

    if config.seed_urls.is_empty() {
        return Err(ConfigError::Validation(
            "scrape needs at least one seed URL".to_string(),
        ));
    }
    for seed in &config.seed_urls {
        validate_http_url("seed URL", seed)?;
    }
    Ok(())
}

fn validate_backfill_config(config: &BackfillConfig) -> ConfigResult<()> {
    validate_client_config("backfill", &config.client)?;
    validate_http_url("cdx-endpoint", &config.cdx_endpoint)?;
    validate_http_url("snapshot-base", &config.snapshot_base)?;
    Ok(())
}

/// Validates the settings of one HTTP client
fn validate_client_config(section: &str, config: &ClientConfig) -> ConfigResult<()> {
    if config.cache_path.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{}: cache-path cannot be empty",
            section
        )));
    }

    if config.worker_count < 1 || config.worker_count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "{}: worker-count must be between 1 and {}, got {}",
            section, MAX_WORKERS, config.worker_count
        )));
    }

    if config.max_queued_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "{}: max-queued-urls must be >= 1, got {}",
            section, config.max_queued_urls
        )));
    }

    if config.max_retry < 1 {
        return Err(ConfigError::Validation(format!(
            "{}: max-retry must be >= 1, got {}",
            section, config.max_retry
        )));
    }

    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{}: allowed-domains cannot be empty",
            section
        )));
    }
    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    for status in &config.permanent_statuses {
        if !(100..=599).contains(status) {
            return Err(ConfigError::Validation(format!(
                "{}: {} is not an HTTP status code",
                section, status
            )));
        }
    }

    Ok(())
}

fn validate_http_url(what: &str, raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            what, raw
        )));
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
