use std::sync::Arc;

use async_trait::async_trait;
use jobharvest_core::{Platform, SearchQuery};

use super::{fetch_cards, keyword_slug, page_url, SourceAdapter};
use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{CardSelectors, Extractor};
use crate::pagination::{paginate, ScrapeOutcome};
use crate::rate_limit::PageDelay;

const SELECTORS: CardSelectors = CardSelectors {
    cards: &["div.individual_internship", "div.internship_meta"],
    title: &[
        Extractor::Text("h3.job-internship-name a"),
        Extractor::Text("a.job-title-href"),
        Extractor::Text("h3.heading_4_5 a"),
    ],
    company: &[
        Extractor::Text("p.company-name"),
        Extractor::Text("a.link_display_like_text"),
        Extractor::Text("h4.heading_6 a"),
    ],
    location: &[
        Extractor::AllText("div.locations a"),
        Extractor::AllText("p.locations span a"),
        Extractor::AllText("a.location_link"),
    ],
    salary: &[
        Extractor::Text("span.desktop"),
        Extractor::Text("div.salary .item_body"),
        Extractor::Text("span.stipend"),
    ],
    job_type: &[Extractor::Text("div.gray-labels div.status-li span")],
    posted: &[
        Extractor::Text("div.status-success span"),
        Extractor::Text("div.status-info span"),
        Extractor::Text("div.status-inactive span"),
    ],
    link: &[
        Extractor::Attr("a.job-title-href", "href"),
        Extractor::SelfAttr("data-href"),
        Extractor::Attr("h3.job-internship-name a", "href"),
    ],
    description: &[Extractor::Text("div.about_job div.text")],
    skills: Some("div.job_skills div.job_skill"),
};

/// Internshala's job (not internship) listings. Links are site-relative.
pub struct InternshalaAdapter {
    fetcher: Arc<dyn PageFetcher>,
    query: SearchQuery,
    delay: PageDelay,
    base_url: String,
}

impl InternshalaAdapter {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, query: SearchQuery, delay: PageDelay) -> Self {
        Self {
            fetcher,
            query,
            delay,
            base_url: Platform::Internshala.base_url().to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    fn page_url(&self, page: u32) -> Result<String, ScraperError> {
        let path = format!(
            "/jobs/{}-jobs/page-{page}",
            keyword_slug(&self.query.keywords)
        );
        page_url(&self.base_url, &path, &[])
    }
}

#[async_trait]
impl SourceAdapter for InternshalaAdapter {
    fn platform(&self) -> Platform {
        Platform::Internshala
    }

    async fn scrape(&self, page_limit: u32) -> Result<ScrapeOutcome, ScraperError> {
        Ok(paginate(Platform::Internshala, page_limit, 1, self.delay, |page| async move {
            let url = self.page_url(page)?;
            fetch_cards(self.fetcher.as_ref(), &url, &SELECTORS, &self.base_url).await
        })
        .await)
    }
}
