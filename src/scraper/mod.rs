//! Scrape and backfill entrypoints
//!
//! The live scraper walks the award listings and stores one award per
//! restaurant for the current edition. The backfill scraper asks the Wayback
//! Machine for every archived copy of each known restaurant page and stores one
//! award per guide year it can date.

mod backfill;
mod live;
mod stats;

pub use backfill::BackfillScraper;
pub use live::LiveScraper;
pub use stats::{RunStats, RunSummary};

use crate::storage::{SqliteRepository, StorageError, StorageResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The repository as shared by every worker
pub type SharedRepository = Arc<Mutex<SqliteRepository>>;

pub fn share(repository: SqliteRepository) -> SharedRepository {
    Arc::new(Mutex::new(repository))
}

fn lock(repository: &Mutex<SqliteRepository>) -> MutexGuard<'_, SqliteRepository> {
    repository.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts validation failures on the way out of a storage call
fn tally<T>(stats: &RunStats, result: StorageResult<T>) -> crate::Result<T> {
    result.map_err(|e| {
        if matches!(e, StorageError::Validation(_)) {
            stats.validation_failed();
        }
        e.into()
    })
}
