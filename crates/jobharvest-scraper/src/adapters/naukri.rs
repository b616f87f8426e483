use std::sync::Arc;

use async_trait::async_trait;
use jobharvest_core::{Platform, SearchQuery};

use super::{fetch_cards, keyword_slug, page_url, SourceAdapter};
use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{CardSelectors, Extractor};
use crate::pagination::{paginate, ScrapeOutcome};
use crate::rate_limit::PageDelay;

/// Consecutive empty pages tolerated before pagination stops.
const EMPTY_PAGE_THRESHOLD: u32 = 2;

const SELECTORS: CardSelectors = CardSelectors {
    cards: &["div.srp-jobtuple-wrapper", "article.jobTuple", "div.cust-job-tuple"],
    title: &[Extractor::Text("a.title"), Extractor::Attr("a.title", "title")],
    company: &[
        Extractor::Text("a.comp-name"),
        Extractor::Text("a.subTitle"),
        Extractor::Text("span.comp-name"),
    ],
    location: &[
        Extractor::Text("span.locWdth"),
        Extractor::Text("li.location span"),
        Extractor::Text("span.loc"),
    ],
    salary: &[
        Extractor::Text("span.sal"),
        Extractor::Text("li.salary span"),
        Extractor::Text("span.sal-wrap"),
    ],
    job_type: &[Extractor::Text("span.job-type")],
    posted: &[
        Extractor::Text("span.job-post-day"),
        Extractor::Text("span.fleft.postedDate"),
        Extractor::Text("div.type br + span"),
    ],
    link: &[Extractor::Attr("a.title", "href")],
    description: &[
        Extractor::Text("span.job-desc"),
        Extractor::Text("div.job-description"),
    ],
    skills: Some("ul.tags-gt li"),
};

/// Naukri search pages. Listings are rendered client-side, so production
/// runs pair this adapter with a browser-backed fetcher when one is available.
pub struct NaukriAdapter {
    fetcher: Arc<dyn PageFetcher>,
    query: SearchQuery,
    delay: PageDelay,
    base_url: String,
}

impl NaukriAdapter {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, query: SearchQuery, delay: PageDelay) -> Self {
        Self {
            fetcher,
            query,
            delay,
            base_url: Platform::Naukri.base_url().to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    fn page_url(&self, page: u32) -> Result<String, ScraperError> {
        let path = format!("/{}-jobs-{page}", keyword_slug(&self.query.keywords));
        page_url(
            &self.base_url,
            &path,
            &[
                ("k", self.query.keywords.clone()),
                ("l", self.query.location.clone()),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for NaukriAdapter {
    fn platform(&self) -> Platform {
        Platform::Naukri
    }

    async fn scrape(&self, page_limit: u32) -> Result<ScrapeOutcome, ScraperError> {
        Ok(paginate(
            Platform::Naukri,
            page_limit,
            EMPTY_PAGE_THRESHOLD,
            self.delay,
            |page| async move {
                let url = self.page_url(page)?;
                fetch_cards(self.fetcher.as_ref(), &url, &SELECTORS, &self.base_url).await
            },
        )
        .await)
    }
}
