use crate::client::FetchStats;
use crate::storage::AwardChange;
use std::sync::atomic::{AtomicU64, Ordering};

/// Persistence counters shared by the handlers of one run
#[derive(Debug, Default)]
pub struct RunStats {
    restaurants_saved: AtomicU64,
    awards_inserted: AtomicU64,
    awards_updated: AtomicU64,
    awards_unchanged: AtomicU64,
    validation_failures: AtomicU64,
    snapshots_enqueued: AtomicU64,
    snapshots_skipped: AtomicU64,
}

impl RunStats {
    pub fn restaurant_saved(&self) {
        self.restaurants_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn award_saved(&self, change: AwardChange) {
        let counter = match change {
            AwardChange::Insert => &self.awards_inserted,
            AwardChange::Update { .. } => &self.awards_updated,
            AwardChange::Unchanged => &self.awards_unchanged,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_failed(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_enqueued(&self) {
        self.snapshots_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_skipped(&self) {
        self.snapshots_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters together with the client's
    pub fn summary(&self, fetch: FetchStats) -> RunSummary {
        RunSummary {
            fetch,
            restaurants_saved: self.restaurants_saved.load(Ordering::Relaxed),
            awards_inserted: self.awards_inserted.load(Ordering::Relaxed),
            awards_updated: self.awards_updated.load(Ordering::Relaxed),
            awards_unchanged: self.awards_unchanged.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            snapshots_enqueued: self.snapshots_enqueued.load(Ordering::Relaxed),
            snapshots_skipped: self.snapshots_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of one scrape or backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetch: FetchStats,
    pub restaurants_saved: u64,
    pub awards_inserted: u64,
    pub awards_updated: u64,
    pub awards_unchanged: u64,
    pub validation_failures: u64,
    pub snapshots_enqueued: u64,
    pub snapshots_skipped: u64,
}

impl RunSummary {
    pub fn log(&self, flow: &str) {
        tracing::info!(
            "{} finished: {} pages fetched, {} cache hits, {} retries, {} dropped",
            flow,
            self.fetch.fetched,
            self.fetch.cache_hits,
            self.fetch.retries,
            self.fetch.dropped
        );
        tracing::info!(
            "{} saved {} restaurants; awards {} inserted, {} updated, {} unchanged; {} failed validation",
            flow,
            self.restaurants_saved,
            self.awards_inserted,
            self.awards_updated,
            self.awards_unchanged,
            self.validation_failures
        );
        if self.snapshots_enqueued > 0 || self.snapshots_skipped > 0 {
            tracing::info!(
                "{} queued {} snapshots, skipped {}",
                flow,
                self.snapshots_enqueued,
                self.snapshots_skipped
            );
        }
    }
}
