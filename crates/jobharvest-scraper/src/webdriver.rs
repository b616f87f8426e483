//! Browser-rendered page fetcher for platforms whose listings only appear
//! after client-side JavaScript runs.
//!
//! Every fetch opens its own headless session and closes it afterwards, so a
//! platform task never shares browser state with another task.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;

use crate::client::{validate_url, PageFetcher};
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub struct WebDriverFetcher {
    server_url: String,
    user_agent: String,
    /// Time given to the page's scripts before the DOM is captured.
    render_wait: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl WebDriverFetcher {
    #[must_use]
    pub fn new(
        server_url: &str,
        user_agent: &str,
        render_wait: Duration,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            server_url: server_url.to_owned(),
            user_agent: user_agent.to_owned(),
            render_wait,
            max_retries,
            backoff_base_ms,
        }
    }

    async fn render_once(&self, url: &str) -> Result<String, ScraperError> {
        let render_err = |e: WebDriverError| ScraperError::Render {
            url: url.to_owned(),
            reason: e.to_string(),
        };

        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless().map_err(render_err)?;
        caps.add_arg("--no-sandbox").map_err(render_err)?;
        caps.add_arg("--disable-dev-shm-usage").map_err(render_err)?;
        caps.add_arg(&format!("--user-agent={}", self.user_agent))
            .map_err(render_err)?;

        let driver = WebDriver::new(self.server_url.as_str(), caps)
            .await
            .map_err(render_err)?;

        let rendered = async {
            driver.goto(url).await?;
            tokio::time::sleep(self.render_wait).await;
            driver.source().await
        }
        .await;

        if let Err(e) = driver.quit().await {
            tracing::warn!(url, error = %e, "failed to close browser session");
        }

        rendered.map_err(render_err)
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        validate_url(url)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.render_once(url)).await
    }
}
