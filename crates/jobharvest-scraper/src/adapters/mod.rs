//! One adapter per job platform.
//!
//! Adapters only know how to address a platform's result pages and where its
//! fields live in the markup. Fetching, pacing, and page iteration are shared.

mod indeed;
mod internshala;
mod linkedin;
mod naukri;

use std::sync::Arc;

use async_trait::async_trait;
use jobharvest_core::{AppConfig, Platform, RawListing, SearchQuery};

use crate::client::{HttpFetcher, PageFetcher};
use crate::error::ScraperError;
use crate::extract::{extract_listings, CardSelectors};
use crate::pagination::ScrapeOutcome;
use crate::rate_limit::PageDelay;

pub use indeed::IndeedAdapter;
pub use internshala::InternshalaAdapter;
pub use linkedin::LinkedInAdapter;
pub use naukri::NaukriAdapter;

/// A platform-specific scraper.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Scrapes up to `page_limit` result pages.
    ///
    /// # Errors
    ///
    /// Only setup failures are errors; failed pages are reported in
    /// [`ScrapeOutcome::page_errors`].
    async fn scrape(&self, page_limit: u32) -> Result<ScrapeOutcome, ScraperError>;
}

/// Builds one adapter per platform, sharing a single HTTP client.
///
/// Naukri renders through a WebDriver session when the `webdriver` feature is
/// enabled and `JOBHARVEST_WEBDRIVER_URL` is set.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the HTTP client cannot be constructed.
pub fn build_adapters(
    config: &AppConfig,
    query: &SearchQuery,
) -> Result<Vec<Arc<dyn SourceAdapter>>, ScraperError> {
    let http: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::from_config(config)?);
    let delay = PageDelay::new(config.scraper_min_delay_ms, config.scraper_max_delay_ms);

    Ok(vec![
        Arc::new(LinkedInAdapter::new(Arc::clone(&http), query.clone(), delay)),
        Arc::new(IndeedAdapter::new(Arc::clone(&http), query.clone(), delay)),
        Arc::new(NaukriAdapter::new(
            naukri_fetcher(config, &http),
            query.clone(),
            delay,
        )),
        Arc::new(InternshalaAdapter::new(http, query.clone(), delay)),
    ])
}

#[cfg(feature = "webdriver")]
fn naukri_fetcher(config: &AppConfig, http: &Arc<dyn PageFetcher>) -> Arc<dyn PageFetcher> {
    match config.webdriver_url.as_deref() {
        Some(url) => {
            tracing::info!(webdriver_url = url, "naukri pages will be browser-rendered");
            Arc::new(crate::webdriver::WebDriverFetcher::new(
                url,
                &config.scraper_user_agent,
                std::time::Duration::from_secs(3),
                config.scraper_max_retries,
                config.scraper_retry_backoff_base_ms,
            ))
        }
        None => Arc::clone(http),
    }
}

#[cfg(not(feature = "webdriver"))]
fn naukri_fetcher(config: &AppConfig, http: &Arc<dyn PageFetcher>) -> Arc<dyn PageFetcher> {
    if config.webdriver_url.is_some() {
        tracing::warn!("JOBHARVEST_WEBDRIVER_URL is set but the webdriver feature is disabled; using plain HTTP");
    }
    Arc::clone(http)
}

/// Fetches one results page and extracts its cards.
async fn fetch_cards(
    fetcher: &dyn PageFetcher,
    url: &str,
    selectors: &CardSelectors,
    base_url: &str,
) -> Result<Vec<RawListing>, ScraperError> {
    let html = fetcher.fetch_html(url).await?;
    Ok(extract_listings(&html, selectors, base_url))
}

/// Builds `{base}{path}?{params}` with proper query encoding.
fn page_url(base: &str, path: &str, params: &[(&str, String)]) -> Result<String, ScraperError> {
    let raw = format!("{}{path}", base.trim_end_matches('/'));
    let url = if params.is_empty() {
        reqwest::Url::parse(&raw)
    } else {
        reqwest::Url::parse_with_params(&raw, params)
    }
    .map_err(|e| ScraperError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(url.to_string())
}

/// `"Software Developer"` → `"software-developer"`, the form path-based
/// search URLs use.
fn keyword_slug(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
