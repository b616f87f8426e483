//! Retry and pacing utilities for page fetches.
//!
//! Provides exponential backoff retry logic for transient HTTP errors and the
//! randomized pause adapters take between consecutive page fetches.
//! Non-retriable errors (404s, 4xx statuses, bad URLs) are propagated
//! immediately without retrying.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

/// Longest `Retry-After` honoured; anything larger is clamped.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Whether a failed fetch is worth another attempt: 429s, transport
/// failures, 5xx statuses, and browser session hiccups. Everything else
/// (404, other 4xx, malformed URLs) fails the page immediately.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) | ScraperError::Render { .. } => {
            true
        }
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. } | ScraperError::InvalidUrl { .. } => false,
    }
}

/// Pause before retry number `retry` (0-based): `backoff_base_ms * 2^retry`,
/// stretched to the server's `Retry-After` when a 429 asked for longer.
fn backoff_for(err: &ScraperError, retry: u32, backoff_base_ms: u64) -> Duration {
    let exponential = backoff_base_ms.saturating_mul(1u64 << retry.min(32));
    let requested = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => (*retry_after_secs).min(MAX_RETRY_AFTER_SECS) * 1000,
        _ => 0,
    };
    Duration::from_millis(exponential.max(requested))
}

/// Runs `fetch`, retrying transient failures up to `max_retries` times with
/// exponential backoff (1 s, 2 s, 4 s… for a 1000 ms base). The final error
/// is returned once retries run out.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut fetch: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match fetch().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && retry < max_retries => err,
            Err(err) => return Err(err),
        };

        let pause = backoff_for(&err, retry, backoff_base_ms);
        tracing::warn!(
            retry = retry + 1,
            max_retries,
            pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient fetch error; backing off"
        );
        tokio::time::sleep(pause).await;
        retry += 1;
    }
}

/// Randomized pause between two page fetches of the same platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl PageDelay {
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// No pause at all; used by tests and one-page runs.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    pub async fn wait(&self) {
        let pause = self.sample();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited(retry_after_secs: u64) -> ScraperError {
        ScraperError::RateLimited {
            domain: "www.naukri.com".to_owned(),
            retry_after_secs,
        }
    }

    fn status(status: u16) -> ScraperError {
        ScraperError::UnexpectedStatus {
            status,
            url: "https://www.naukri.com/rust-jobs-1".to_owned(),
        }
    }

    /// Fails `failures` times with errors from `make`, then succeeds.
    /// Returns the outcome and how many attempts were made.
    async fn attempts(
        max_retries: u32,
        failures: u32,
        make: fn() -> ScraperError,
    ) -> (Result<&'static str, ScraperError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < failures {
                    Err(make())
                } else {
                    Ok("<html></html>")
                }
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_makes_one_attempt() {
        let (result, calls) = attempts(3, 0, || status(500)).await;
        assert_eq!(result.unwrap(), "<html></html>");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let (result, calls) = attempts(3, 2, || rate_limited(0)).await;
        assert!(result.is_ok());
        assert_eq!(calls, 3);

        let (result, calls) = attempts(3, 3, || status(502)).await;
        assert!(result.is_ok());
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn gives_up_with_last_error_after_max_retries() {
        let (result, calls) = attempts(2, u32::MAX, || status(503)).await;
        assert_eq!(calls, 3);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let (result, calls) = attempts(3, u32::MAX, || status(403)).await;
        assert_eq!(calls, 1);
        assert!(result.is_err());

        let (result, calls) = attempts(3, u32::MAX, || ScraperError::NotFound {
            url: "https://internshala.com/jobs/page-9".to_owned(),
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[test]
    fn backoff_doubles_and_honours_retry_after() {
        let err = status(500);
        assert_eq!(backoff_for(&err, 0, 1000), Duration::from_secs(1));
        assert_eq!(backoff_for(&err, 2, 1000), Duration::from_secs(4));

        assert_eq!(backoff_for(&rate_limited(30), 0, 1000), Duration::from_secs(30));
        assert_eq!(backoff_for(&rate_limited(1), 3, 1000), Duration::from_secs(8));
        assert_eq!(backoff_for(&rate_limited(3600), 0, 1000), Duration::from_secs(60));
    }

    #[test]
    fn page_delay_samples_within_bounds() {
        let delay = PageDelay::new(1000, 3500);
        for _ in 0..100 {
            let d = delay.sample();
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(3500));
        }
    }

    #[test]
    fn page_delay_normalizes_inverted_bounds() {
        let delay = PageDelay::new(500, 100);
        assert_eq!(delay.min_ms, 100);
        assert_eq!(delay.max_ms, 500);
    }

    #[test]
    fn page_delay_none_is_zero() {
        assert_eq!(PageDelay::none().sample(), Duration::ZERO);
    }
}
