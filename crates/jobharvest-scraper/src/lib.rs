//! Platform scraping for jobharvest: page fetchers, pacing and retry,
//! multi-selector extraction, the per-platform source adapters, and the text
//! normalizer that turns their output into [`jobharvest_core::NormalizedListing`]s.

pub mod adapters;
pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pagination;
pub mod parse;
pub mod rate_limit;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use adapters::{
    build_adapters, IndeedAdapter, InternshalaAdapter, LinkedInAdapter, NaukriAdapter,
    SourceAdapter,
};
pub use client::{HttpFetcher, PageFetcher};
pub use error::ScraperError;
pub use extract::{extract_listings, CardSelectors, Extractor};
pub use normalize::{clean_text, is_valid_job, normalize_listing, resolve_link};
pub use pagination::ScrapeOutcome;
pub use parse::{extract_salary, parse_job_posting_date};
pub use rate_limit::PageDelay;
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverFetcher;
