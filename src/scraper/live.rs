//! Live guide scraper

use super::{lock, tally, RunStats, RunSummary, SharedRepository};
use crate::client::{Collector, RequestContext, Response};
use crate::config::Config;
use crate::extract::{extract_listing, extract_restaurant, Source};
use crate::parse::current_year;
use crate::storage::{Repository, Restaurant, RestaurantAward};
use crate::url::normalize_url;
use crate::HarvestError;
use scraper::Html;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Walks the award listings and scrapes every restaurant they link to
pub struct LiveScraper {
    config: Arc<Config>,
    collector: Collector,
    stats: Arc<RunStats>,
}

impl LiveScraper {
    /// Creates the scraper and registers its listing and detail handlers
    ///
    /// # Arguments
    ///
    /// * `config` - Seeds and client settings come from `config.scrape`
    /// * `repository` - Where restaurants and awards are written
    pub fn new(config: Arc<Config>, repository: SharedRepository) -> Result<Self, HarvestError> {
        let collector = Collector::new(&config.scrape.client)?;
        let stats = Arc::new(RunStats::default());

        collector.on_response(handle_listing);

        let detail_stats = Arc::clone(&stats);
        collector
            .detail()
            .on_response(move |response, _| handle_detail(response, &repository, &detail_stats));

        Ok(Self {
            config,
            collector,
            stats,
        })
    }

    /// Runs until every queued page is handled or `cancel` fires
    ///
    /// With a `target` restaurant URL the listings are skipped and only that
    /// detail page is scraped.
    pub async fn run(
        &self,
        target: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, HarvestError> {
        match target {
            Some(url) => {
                let url = normalize_url(url)?;
                tracing::info!("Scraping single restaurant {}", url);
                self.collector.detail().enqueue(url.as_str())?;
            }
            None => {
                tracing::info!(
                    "Seeding {} listing pages",
                    self.config.scrape.seed_urls.len()
                );
                for seed in &self.config.scrape.seed_urls {
                    self.collector.enqueue(seed)?;
                }
            }
        }

        let fetch = self.collector.run(cancel).await?;
        let summary = self.stats.summary(fetch);
        summary.log("Scrape");
        Ok(summary)
    }
}

/// Queues every card's detail page with its card values, then the next page
fn handle_listing(response: &Response, collector: &Collector) -> crate::Result<()> {
    let page = {
        let document = Html::parse_document(&response.body);
        extract_listing(&document, &response.request.url)
    };
    let referer = response.request.url.as_str();

    tracing::debug!(
        "Listing {} has {} restaurants",
        referer,
        page.cards.len()
    );

    let detail = collector.detail();
    for card in &page.cards {
        match normalize_url(&card.url) {
            Ok(url) => {
                detail.enqueue_with(url.as_str(), card.context(), Some(referer))?;
            }
            Err(e) => tracing::debug!("Skipping card link {}: {}", card.url, e),
        }
    }

    if let Some(next) = page.next_page {
        collector.enqueue_with(&next, RequestContext::default(), Some(referer))?;
    }
    Ok(())
}

/// Extracts one restaurant page and stores the restaurant and its award
fn handle_detail(
    response: &Response,
    repository: &SharedRepository,
    stats: &RunStats,
) -> crate::Result<()> {
    let url = normalize_url(response.request.url.as_str())?;
    let mut data = {
        let document = Html::parse_document(&response.body);
        extract_restaurant(
            &document,
            url.as_str(),
            Source::Live,
            &response.request.context,
        )
    };

    // The live site always shows the current edition
    if data.year == 0 {
        data.year = current_year();
    }

    let mut repo = lock(repository);
    let restaurant_id = tally(stats, repo.save_restaurant(&Restaurant::from(&data)))?;
    stats.restaurant_saved();

    let change = tally(
        stats,
        repo.save_award(&RestaurantAward::from_data(restaurant_id, &data)),
    )?;
    stats.award_saved(change);

    tracing::debug!(
        "Saved {} ({}, {} {})",
        data.name,
        data.distinction,
        data.year,
        data.price
    );
    Ok(())
}
