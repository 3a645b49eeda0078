use michelin_my_maps::config::{BackfillConfig, ClientConfig, Config, DatabaseConfig, ScrapeConfig};
use michelin_my_maps::scraper::{share, SharedRepository};
use michelin_my_maps::storage::open_repository;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Client settings pointed at a local mock server: no politeness delay
pub fn client_config(cache_dir: &Path) -> ClientConfig {
    ClientConfig {
        cache_path: cache_dir.to_string_lossy().into_owned(),
        allowed_domains: vec!["127.0.0.1".to_string()],
        delay: Duration::from_millis(10),
        random_delay: Duration::ZERO,
        worker_count: 2,
        max_queued_urls: 100,
        max_retry: 3,
        permanent_statuses: vec![401, 403, 404],
        request_timeout: Duration::from_secs(5),
    }
}

/// Creates a test configuration whose seeds and Wayback endpoints live on `base_url`
pub fn create_test_config(base_url: &str, seeds: Vec<String>, dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: dir.path().join("michelin.db").to_string_lossy().into_owned(),
        },
        scrape: ScrapeConfig {
            client: client_config(&dir.path().join("cache/scrape")),
            seed_urls: seeds,
        },
        backfill: BackfillConfig {
            client: client_config(&dir.path().join("cache/wayback")),
            cdx_endpoint: format!("{}/cdx", base_url),
            snapshot_base: format!("{}/web", base_url),
        },
    }
}

pub fn open_shared(config: &Config) -> SharedRepository {
    share(open_repository(Path::new(&config.database.path)).expect("Failed to open database"))
}

pub fn arc(config: Config) -> Arc<Config> {
    Arc::new(config)
}

/// Modern detail page for Les Amis
pub const LES_AMIS: &str = r#"
<html>
<head>
  <script type="application/ld+json">
    {"@context":"http://schema.org","@type":"Restaurant","name":"Les Amis",
     "latitude":"1.3050","longitude":"103.8268",
     "award":{"@type":"Award","dateAwarded":"2024-06-25"}}
  </script>
</head>
<body>
  <h1 class="data-sheet__title">Les Amis</h1>
  <div class="data-sheet__block">
    <div class="data-sheet__block--text">Shaw Centre, #01-16, 1 Scotts Road, 228208, Singapore</div>
    <div class="data-sheet__block--text">$$$$ · French</div>
  </div>
  <div class="data-sheet__classification">
    <div class="data-sheet__classification-item--content">Three Stars: Exceptional cuisine</div>
  </div>
  <div class="data-sheet__description">A temple of French gastronomy.</div>
  <a data-event="CTA_tel" href="tel:+65 6733 2225">+65 6733 2225</a>
</body>
</html>
"#;

/// Modern detail page for Odette, a two star restaurant with no dated award
pub const ODETTE: &str = r#"
<html>
<body>
  <h1 class="data-sheet__title">Odette</h1>
  <div class="data-sheet__block">
    <div class="data-sheet__block--text">1 Saint Andrew's Road, #01-04, National Gallery, 178957, Singapore</div>
    <div class="data-sheet__block--text">$$$$ · French Contemporary</div>
  </div>
  <div class="data-sheet__classification">
    <div class="data-sheet__classification-item--content">Two Stars: Excellent cooking</div>
  </div>
</body>
</html>
"#;

/// 2019-era snapshot carrying its award in the analytics data layer
pub const SNAPSHOT_2019: &str = r#"
<html>
<head>
  <script>
    var dLayer = {};
    dLayer['distinction'] = '1 star';
    dLayer['price'] = 'CAT_P02';
    dLayer['greenstar'] = 'True';
  </script>
</head>
<body>
  <h2 class="restaurant-details__heading--title">Les Amis</h2>
  <div class="restaurant-details__heading--label-title">2019 MICHELIN Guide Singapore</div>
</body>
</html>
"#;

/// 2021-era snapshot dated by its meta description
pub const SNAPSHOT_2021: &str = r#"
<html>
<head>
  <meta name="description" content="Les Amis, a Two Stars restaurant in the MICHELIN Guide Singapore 2021">
</head>
<body>
  <h1 class="data-sheet__title">Les Amis</h1>
  <div class="data-sheet__block">
    <div class="data-sheet__block--text">1 Scotts Road, 228208, Singapore</div>
    <div class="data-sheet__block--text">$$$ · French</div>
  </div>
  <div class="data-sheet__classification">
    <div class="data-sheet__classification-item--content">Two Stars: Excellent cooking</div>
  </div>
</body>
</html>
"#;
