//! Wayback Machine backfill

use super::{lock, tally, RunStats, RunSummary, SharedRepository};
use crate::client::{Collector, Failure, RequestContext, Response};
use crate::config::Config;
use crate::extract::{extract_restaurant, Source};
use crate::storage::{Repository, RestaurantAward};
use crate::url::{cdx_lookup_url, extract_original_url, is_valid_timestamp, normalize_url, snapshot_url};
use crate::HarvestError;
use scraper::Html;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Rebuilds each known restaurant's award history from archived pages
///
/// Per restaurant URL: one CDX lookup on the main route, then one snapshot
/// fetch per archived timestamp on the detail route.
pub struct BackfillScraper {
    config: Arc<Config>,
    repository: SharedRepository,
    collector: Collector,
    stats: Arc<RunStats>,
}

impl BackfillScraper {
    /// Creates the scraper and registers its CDX and snapshot handlers
    ///
    /// # Arguments
    ///
    /// * `config` - Client settings and Wayback endpoints come from `config.backfill`
    /// * `repository` - Source of restaurant URLs and destination for awards
    pub fn new(config: Arc<Config>, repository: SharedRepository) -> Result<Self, HarvestError> {
        let collector = Collector::new(&config.backfill.client)?;
        let stats = Arc::new(RunStats::default());

        let snapshot_base = config.backfill.snapshot_base.clone();
        let cdx_stats = Arc::clone(&stats);
        collector.on_response(move |response, collector| {
            handle_cdx(response, collector, &snapshot_base, &cdx_stats)
        });
        collector.on_error(log_cdx_failure);

        let snapshot_repo = Arc::clone(&repository);
        let snapshot_stats = Arc::clone(&stats);
        collector.detail().on_response(move |response, _| {
            handle_snapshot(response, &snapshot_repo, &snapshot_stats)
        });

        Ok(Self {
            config,
            repository,
            collector,
            stats,
        })
    }

    /// Queues a CDX lookup per restaurant and runs until every snapshot is handled
    ///
    /// With a `target` URL only that restaurant is backfilled; it must already
    /// be in the repository.
    pub async fn run(
        &self,
        target: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, HarvestError> {
        let urls: Vec<String> = {
            let repo = lock(&self.repository);
            match target {
                Some(url) => {
                    let url = normalize_url(url)?;
                    match repo.find_restaurant_by_url(url.as_str())? {
                        Some(record) => vec![record.restaurant.url],
                        None => {
                            tracing::warn!("Restaurant {} is not in the database", url);
                            Vec::new()
                        }
                    }
                }
                None => repo
                    .list_all_restaurants_with_url()?
                    .into_iter()
                    .map(|record| record.restaurant.url)
                    .collect(),
            }
        };

        tracing::info!("Looking up Wayback snapshots for {} restaurants", urls.len());
        for url in urls {
            let lookup = cdx_lookup_url(&self.config.backfill.cdx_endpoint, &url);
            let context = RequestContext {
                original_url: Some(url),
                ..RequestContext::default()
            };
            self.collector.enqueue_with(&lookup, context, None)?;
        }

        let fetch = self.collector.run(cancel).await?;
        let summary = self.stats.summary(fetch);
        summary.log("Backfill");
        Ok(summary)
    }
}

/// Parses a CDX answer and queues one snapshot per well-formed timestamp
fn handle_cdx(
    response: &Response,
    collector: &Collector,
    snapshot_base: &str,
    stats: &RunStats,
) -> crate::Result<()> {
    let Some(original) = response.request.context.original_url.as_deref() else {
        tracing::warn!("CDX response {} has no restaurant URL", response.request.url);
        return Ok(());
    };

    // An empty body means no captures
    if response.body.trim().is_empty() {
        tracing::debug!("No snapshots for {}", original);
        return Ok(());
    }
    let rows: Vec<Vec<String>> = serde_json::from_str(&response.body)?;

    let detail = collector.detail();
    let mut queued = 0;
    // Row 0 is the header
    for row in rows.iter().skip(1) {
        let Some(timestamp) = row.first() else {
            continue;
        };
        if !is_valid_timestamp(timestamp) {
            tracing::debug!("Skipping malformed CDX timestamp '{}' for {}", timestamp, original);
            continue;
        }

        let snapshot = snapshot_url(snapshot_base, timestamp, original);
        let context = RequestContext {
            original_url: Some(original.to_string()),
            ..RequestContext::default()
        };
        if detail.enqueue_with(&snapshot, context, None)? {
            stats.snapshot_enqueued();
            queued += 1;
        }
    }

    tracing::debug!("Queued {} snapshots for {}", queued, original);
    Ok(())
}

fn log_cdx_failure(failure: &Failure, _: &Collector) {
    if let Some(original) = failure.request.context.original_url.as_deref() {
        tracing::debug!(
            "CDX lookup for {} failed on attempt {}: {}",
            original,
            failure.request.attempt,
            failure.error
        );
    }
}

/// Extracts a snapshot and reconciles its award into the original restaurant
fn handle_snapshot(
    response: &Response,
    repository: &SharedRepository,
    stats: &RunStats,
) -> crate::Result<()> {
    let snapshot = response.request.url.as_str();
    let original = extract_original_url(snapshot)?;

    let restaurant_id = match lock(repository).find_restaurant_by_url(original.as_str())? {
        Some(record) => record.id,
        None => {
            tracing::debug!("Skipping snapshot {}: {} is unknown", snapshot, original);
            stats.snapshot_skipped();
            return Ok(());
        }
    };

    let data = {
        let document = Html::parse_document(&response.body);
        extract_restaurant(
            &document,
            original.as_str(),
            Source::Wayback {
                snapshot_url: snapshot.to_string(),
            },
            &RequestContext::default(),
        )
    };

    if data.year == 0 {
        tracing::warn!("Dropping snapshot {}: no award year found", snapshot);
        stats.snapshot_skipped();
        return Ok(());
    }

    let change = tally(
        stats,
        lock(repository).save_award(&RestaurantAward::from_data(restaurant_id, &data)),
    )?;
    stats.award_saved(change);

    tracing::debug!(
        "Snapshot {} gives {} in {} ({})",
        snapshot,
        data.distinction,
        data.year,
        data.price
    );
    Ok(())
}
