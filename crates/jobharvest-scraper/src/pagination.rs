//! Sequential page walker shared by every source adapter.

use std::future::Future;

use jobharvest_core::{Platform, RawListing};

use crate::error::ScraperError;
use crate::rate_limit::PageDelay;

/// What one adapter run produced. Always partial-result friendly: failed
/// pages are described in `page_errors` instead of failing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub listings: Vec<RawListing>,
    /// Pages that were fetched successfully, empty or not.
    pub pages_fetched: u32,
    pub page_errors: Vec<String>,
}

/// Walks pages `1..=page_limit` in order.
///
/// - Pauses for `delay` before every page after the first.
/// - A page error is logged, recorded in `page_errors`, and the walk continues.
/// - After `empty_page_threshold` consecutive successful-but-empty pages the
///   walk stops early.
pub(crate) async fn paginate<F, Fut>(
    platform: Platform,
    page_limit: u32,
    empty_page_threshold: u32,
    delay: PageDelay,
    mut fetch_page: F,
) -> ScrapeOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<RawListing>, ScraperError>>,
{
    let mut outcome = ScrapeOutcome::default();
    let mut consecutive_empty = 0u32;

    for page in 1..=page_limit {
        if page > 1 {
            delay.wait().await;
        }

        match fetch_page(page).await {
            Ok(listings) if listings.is_empty() => {
                outcome.pages_fetched += 1;
                consecutive_empty += 1;
                tracing::debug!(%platform, page, consecutive_empty, "empty results page");
                if consecutive_empty >= empty_page_threshold.max(1) {
                    tracing::info!(%platform, page, "no more results; stopping pagination early");
                    break;
                }
            }
            Ok(listings) => {
                outcome.pages_fetched += 1;
                consecutive_empty = 0;
                tracing::debug!(%platform, page, count = listings.len(), "results page extracted");
                outcome.listings.extend(listings);
            }
            Err(e) => {
                tracing::warn!(%platform, page, error = %e, "page fetch failed; continuing");
                outcome.page_errors.push(format!("page {page}: {e}"));
            }
        }
    }

    outcome
}
