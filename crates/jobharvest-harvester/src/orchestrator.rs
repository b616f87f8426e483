//! Harvest cycle orchestration: concurrent per-platform scraping under
//! deadlines, normalization, merging, and the closing retention sweep.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use jobharvest_core::{HarvestConfig, HarvestResult, NormalizedListing, Platform, PlatformSummary};
use jobharvest_db::ListingStore;
use jobharvest_scraper::{normalize_listing, ScrapeOutcome, SourceAdapter};

use crate::error::HarvestError;
use crate::merger::save_listings;
use crate::sweeper;

/// How one platform task ended.
#[derive(Debug)]
enum PlatformRun {
    Completed(ScrapeOutcome),
    Failed(String),
}

/// Runs harvest cycles against a set of adapters and a listing store.
pub struct Harvester {
    store: Arc<dyn ListingStore>,
    adapters: BTreeMap<Platform, Arc<dyn SourceAdapter>>,
    retention_days: u32,
}

impl Harvester {
    /// Registers `adapters` by their platform; a later adapter for the same
    /// platform replaces an earlier one.
    #[must_use]
    pub fn new(
        store: Arc<dyn ListingStore>,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        retention_days: u32,
    ) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.platform(), adapter))
            .collect();
        Self {
            store,
            adapters,
            retention_days,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    #[must_use]
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Runs one full cycle over every enabled platform in `config`.
    ///
    /// Platform failures, panics, and timeouts are recorded in the result and
    /// never abort the cycle.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::StoreUnavailable`] if the preflight health check fails.
    /// - [`HarvestError::Store`] if a merge or the retention sweep fails.
    pub async fn run_harvest_cycle(
        &self,
        config: &HarvestConfig,
    ) -> Result<HarvestResult, HarvestError> {
        let started_at = Utc::now();
        let mut result = HarvestResult::new(started_at);

        self.store
            .health_check()
            .await
            .map_err(HarvestError::StoreUnavailable)?;

        let enabled: Vec<(Platform, u32, u64)> = config
            .enabled()
            .map(|(platform, pc)| (platform, pc.page_count, pc.timeout_ms_or_default(platform)))
            .collect();

        tracing::info!(platforms = enabled.len(), "harvest cycle started");

        let runs = join_all(
            enabled
                .into_iter()
                .map(|(platform, pages, timeout_ms)| self.run_platform(platform, pages, timeout_ms)),
        )
        .await;

        for (platform, run) in runs {
            let summary = self.settle_platform(platform, run, started_at).await?;
            result.record(platform, summary);
        }

        result.swept =
            sweeper::sweep_old_listings(self.store.as_ref(), self.retention_days, Utc::now())
                .await?;
        result.finished_at = Utc::now();

        tracing::info!(
            scraped = result.total_scraped,
            saved = result.total_saved,
            failed = result.total_failed,
            swept = result.swept,
            errors = result.errors.len(),
            elapsed_ms = (result.finished_at - result.started_at).num_milliseconds(),
            "harvest cycle finished"
        );
        Ok(result)
    }

    /// Deletes listings posted more than `max_age_days` ago.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Store`] if the delete fails.
    pub async fn sweep_old_listings(&self, max_age_days: u32) -> Result<u64, HarvestError> {
        Ok(sweeper::sweep_old_listings(self.store.as_ref(), max_age_days, Utc::now()).await?)
    }

    /// Scrapes one platform on its own task, aborting it after `timeout_ms`.
    async fn run_platform(
        &self,
        platform: Platform,
        pages: u32,
        timeout_ms: u64,
    ) -> (Platform, PlatformRun) {
        let Some(adapter) = self.adapters.get(&platform).map(Arc::clone) else {
            tracing::warn!(%platform, "platform enabled but no adapter registered");
            return (platform, PlatformRun::Failed("no adapter registered".to_owned()));
        };

        tracing::info!(%platform, pages, timeout_ms, "scraping platform");
        let mut handle = tokio::spawn(async move { adapter.scrape(pages).await });

        let run = match tokio::time::timeout(Duration::from_millis(timeout_ms), &mut handle).await {
            Ok(Ok(Ok(outcome))) => PlatformRun::Completed(outcome),
            Ok(Ok(Err(e))) => {
                tracing::error!(%platform, error = %e, "adapter failed");
                PlatformRun::Failed(e.to_string())
            }
            Ok(Err(join_err)) => {
                tracing::error!(%platform, error = %join_err, "adapter task panicked");
                PlatformRun::Failed(format!("adapter task failed: {join_err}"))
            }
            Err(_) => {
                handle.abort();
                tracing::warn!(%platform, timeout_ms, "platform timed out; task aborted");
                PlatformRun::Failed(format!("timed out after {timeout_ms}ms"))
            }
        };
        (platform, run)
    }

    /// Normalizes a finished platform run and merges it into the store.
    async fn settle_platform(
        &self,
        platform: Platform,
        run: PlatformRun,
        harvested_at: DateTime<Utc>,
    ) -> Result<PlatformSummary, HarvestError> {
        let outcome = match run {
            PlatformRun::Completed(outcome) => outcome,
            PlatformRun::Failed(reason) => {
                return Ok(PlatformSummary {
                    errors: vec![reason],
                    ..PlatformSummary::default()
                });
            }
        };

        let normalized: Vec<NormalizedListing> = outcome
            .listings
            .iter()
            .filter_map(|raw| normalize_listing(raw, platform, harvested_at))
            .collect();
        let invalid = outcome.listings.len() - normalized.len();
        if invalid > 0 {
            tracing::debug!(%platform, invalid, "dropped listings that failed validation");
        }

        let report = save_listings(self.store.as_ref(), platform, &normalized).await?;

        Ok(PlatformSummary {
            scraped: outcome.listings.len(),
            saved: report.saved,
            failed: invalid + report.skipped,
            errors: outcome.page_errors,
        })
    }
}
