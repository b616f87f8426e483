use std::sync::Arc;

use async_trait::async_trait;
use jobharvest_core::{Platform, SearchQuery};

use super::{fetch_cards, page_url, SourceAdapter};
use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{CardSelectors, Extractor};
use crate::pagination::{paginate, ScrapeOutcome};
use crate::rate_limit::PageDelay;

const PAGE_SIZE: u32 = 10;

const SELECTORS: CardSelectors = CardSelectors {
    cards: &["div.job_seen_beacon", "td.resultContent", "div.jobsearch-SerpJobCard"],
    title: &[
        Extractor::Attr("h2.jobTitle span[title]", "title"),
        Extractor::Text("h2.jobTitle span"),
        Extractor::Text("h2.jobTitle"),
    ],
    company: &[
        Extractor::Text("span[data-testid='company-name']"),
        Extractor::Text("span.companyName"),
    ],
    location: &[
        Extractor::Text("div[data-testid='text-location']"),
        Extractor::Text("div.companyLocation"),
    ],
    salary: &[
        Extractor::Text("div.salary-snippet-container"),
        Extractor::Text("div[data-testid='attribute_snippet_testid']"),
        Extractor::Text("span.salary-snippet"),
    ],
    job_type: &[Extractor::Text("div.metadata div[data-testid='attribute_snippet_testid']")],
    posted: &[
        Extractor::Text("span[data-testid='myJobsStateDate']"),
        Extractor::Text("span.date"),
    ],
    link: &[
        Extractor::Attr("h2.jobTitle a", "href"),
        Extractor::Attr("a.jcs-JobTitle", "href"),
    ],
    description: &[
        Extractor::Text("div.job-snippet"),
        Extractor::Text("div[data-testid='jobsnippet_footer']"),
    ],
    skills: None,
};

/// Indeed India job search. Result links are site-relative.
pub struct IndeedAdapter {
    fetcher: Arc<dyn PageFetcher>,
    query: SearchQuery,
    delay: PageDelay,
    base_url: String,
}

impl IndeedAdapter {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, query: SearchQuery, delay: PageDelay) -> Self {
        Self {
            fetcher,
            query,
            delay,
            base_url: Platform::Indeed.base_url().to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    fn page_url(&self, page: u32) -> Result<String, ScraperError> {
        page_url(
            &self.base_url,
            "/jobs",
            &[
                ("q", self.query.keywords.clone()),
                ("l", self.query.location.clone()),
                ("start", ((page - 1) * PAGE_SIZE).to_string()),
            ],
        )
    }
}

#[async_trait]
impl SourceAdapter for IndeedAdapter {
    fn platform(&self) -> Platform {
        Platform::Indeed
    }

    async fn scrape(&self, page_limit: u32) -> Result<ScrapeOutcome, ScraperError> {
        Ok(paginate(Platform::Indeed, page_limit, 1, self.delay, |page| async move {
            let url = self.page_url(page)?;
            fetch_cards(self.fetcher.as_ref(), &url, &SELECTORS, &self.base_url).await
        })
        .await)
    }
}
