use std::sync::Arc;

use async_trait::async_trait;
use jobharvest_core::{Platform, SearchQuery};

use super::{fetch_cards, page_url, SourceAdapter};
use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{CardSelectors, Extractor};
use crate::pagination::{paginate, ScrapeOutcome};
use crate::rate_limit::PageDelay;

/// Cards returned per page by the guest search endpoint.
const PAGE_SIZE: u32 = 25;

const SELECTORS: CardSelectors = CardSelectors {
    cards: &["div.base-card", "div.job-search-card", "li"],
    title: &[
        Extractor::Text("h3.base-search-card__title"),
        Extractor::Text("span.sr-only"),
    ],
    company: &[
        Extractor::Text("h4.base-search-card__subtitle a"),
        Extractor::Text("h4.base-search-card__subtitle"),
    ],
    location: &[Extractor::Text("span.job-search-card__location")],
    salary: &[Extractor::Text("span.job-search-card__salary-info")],
    job_type: &[Extractor::Text("span.job-search-card__employment-type")],
    posted: &[
        Extractor::Attr("time", "datetime"),
        Extractor::Text("time"),
    ],
    link: &[
        Extractor::Attr("a.base-card__full-link", "href"),
        Extractor::Attr("a", "href"),
    ],
    description: &[],
    skills: None,
};

/// LinkedIn's public guest job search.
pub struct LinkedInAdapter {
    fetcher: Arc<dyn PageFetcher>,
    query: SearchQuery,
    delay: PageDelay,
    base_url: String,
}

impl LinkedInAdapter {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, query: SearchQuery, delay: PageDelay) -> Self {
        Self {
            fetcher,
            query,
            delay,
            base_url: Platform::LinkedIn.base_url().to_owned(),
        }
    }

    /// Points the adapter at a different host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    fn page_url(&self, page: u32) -> Result<String, ScraperError> {
        page_url(
            &self.base_url,
            "/jobs-guest/jobs/api/seeMoreJobPostings/search",
            &[
                ("keywords", self.query.keywords.clone()),
                ("location", self.query.location.clone()),
                ("start", ((page - 1) * PAGE_SIZE).to_string()),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for LinkedInAdapter {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn scrape(&self, page_limit: u32) -> Result<ScrapeOutcome, ScraperError> {
        Ok(paginate(Platform::LinkedIn, page_limit, 1, self.delay, |page| async move {
            let url = self.page_url(page)?;
            fetch_cards(self.fetcher.as_ref(), &url, &SELECTORS, &self.base_url).await
        })
        .await)
    }
}
