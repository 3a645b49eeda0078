//! Michelin-My-Maps main entry point
//!
//! This is the command-line interface for the Michelin Guide harvester.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use michelin_my_maps::client::ClientError;
use michelin_my_maps::config::{load_config_with_hash, Config};
use michelin_my_maps::output::{load_statistics, print_statistics};
use michelin_my_maps::scraper::{share, BackfillScraper, LiveScraper};
use michelin_my_maps::storage::{open_repository, StorageError};
use michelin_my_maps::{ConfigError, HarvestError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Michelin-My-Maps: a historically-aware Michelin Guide harvester
///
/// Scrapes every restaurant from the Michelin Guide award listings and
/// back-fills one award per guide year from Wayback Machine snapshots.
#[derive(Parser, Debug)]
#[command(name = "mym")]
#[command(version, about = "Michelin Guide harvester", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log: LogLevel,

    /// Path to a TOML configuration file (built-in defaults otherwise)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the live guide listings, or a single restaurant page
    Scrape {
        /// Restaurant detail URL to scrape instead of the listings
        url: Option<String>,
    },

    /// Back-fill award history from Wayback Machine snapshots
    Backfill {
        /// Restrict the backfill to one restaurant already in the database
        url: Option<String>,
    },

    /// Show statistics from the database and exit
    Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => "error",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_exit_code(&e) {
            Some(code) => {
                let _ = e.print();
                return ExitCode::from(code);
            }
            None => e.exit(),
        },
    };

    setup_logging(cli.log);

    let config = match load(cli.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return ExitCode::from(exit_code(&e));
        }
    };

    let result = match cli.command {
        Command::Scrape { url } => handle_scrape(config, url.as_deref()).await,
        Command::Backfill { url } => handle_backfill(config, url.as_deref()).await,
        Command::Stats => handle_stats(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code for a command-line parse failure
///
/// `None` for `--help` and `--version`, which clap prints and exits on with
/// success. Every other parse failure is a startup error.
fn usage_exit_code(error: &clap::Error) -> Option<u8> {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(1),
    }
}

/// Sets up the logging/tracing subscriber for the requested level
fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::new(format!("michelin_my_maps={},warn", level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the built-in defaults when none is given
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("Using built-in configuration");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Maps a failure onto the process exit code
///
/// 2 for I/O and database failures, 1 for everything else (configuration,
/// bad arguments, queue overflow).
fn exit_code(error: &anyhow::Error) -> u8 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<HarvestError>() {
            return match e {
                HarvestError::Io(_) | HarvestError::Database(_) | HarvestError::Storage(_) => 2,
                HarvestError::Client(ClientError::Cache { .. }) => 2,
                _ => 1,
            };
        }
        if cause.is::<StorageError>() || cause.is::<rusqlite::Error>() {
            return 2;
        }
        if cause.is::<ConfigError>() {
            return 1;
        }
    }
    1
}

/// Opens the database named in the configuration
fn open(config: &Config) -> anyhow::Result<michelin_my_maps::storage::SqliteRepository> {
    let path = Path::new(&config.database.path);
    tracing::info!("Database: {}", path.display());
    open_repository(path).with_context(|| format!("opening database {}", path.display()))
}

/// Cancels the token on Ctrl-C so workers wind down
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight requests");
            token.cancel();
        }
    });
    cancel
}

/// Handles `mym scrape [url]`
async fn handle_scrape(config: Arc<Config>, url: Option<&str>) -> anyhow::Result<()> {
    let repository = share(open(&config)?);
    let scraper = LiveScraper::new(Arc::clone(&config), repository)?;
    scraper.run(url, cancel_on_ctrl_c()).await?;
    Ok(())
}

/// Handles `mym backfill [url]`
async fn handle_backfill(config: Arc<Config>, url: Option<&str>) -> anyhow::Result<()> {
    let repository = share(open(&config)?);
    let scraper = BackfillScraper::new(Arc::clone(&config), repository)?;
    scraper.run(url, cancel_on_ctrl_c()).await?;
    Ok(())
}

/// Handles `mym stats`: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let repository = open(config)?;
    let stats = load_statistics(&repository)?;
    print_statistics(&stats);
    Ok(())
}
