//! Configuration module
//!
//! Every setting has a built-in default matching the production crawl. A TOML
//! file may override any subset of them.
//!
//! # Example
//!
//! ```no_run
//! use michelin_my_maps::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mym.toml")).unwrap();
//! println!("Backfill workers: {}", config.backfill.client.worker_count);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    BackfillConfig, ClientConfig, Config, DatabaseConfig, ScrapeConfig, DEFAULT_CDX_ENDPOINT,
    DEFAULT_DATABASE_PATH, DEFAULT_SEED_URLS, DEFAULT_SNAPSHOT_BASE,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
