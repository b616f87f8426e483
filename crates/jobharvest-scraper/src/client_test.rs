use super::*;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher(max_retries: u32) -> HttpFetcher {
    HttpFetcher::new(5, "jobharvest-test/0.1", max_retries, 0).expect("failed to build test fetcher")
}

#[test]
fn validate_url_accepts_https() {
    assert!(validate_url("https://www.naukri.com/rust-jobs-1").is_ok());
}

#[test]
fn validate_url_rejects_relative() {
    let err = validate_url("/jobs?q=rust").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}

#[test]
fn validate_url_rejects_other_schemes() {
    let err = validate_url("ftp://example.com/jobs").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { ref reason, .. } if reason.contains("ftp")));
}

#[test]
fn extract_domain_returns_host() {
    assert_eq!(
        extract_domain("https://in.indeed.com/jobs?q=rust"),
        "in.indeed.com"
    );
}

#[test]
fn extract_domain_falls_back_to_input() {
    assert_eq!(extract_domain("not a url"), "not a url");
}

#[tokio::test]
async fn fetch_html_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let body = test_fetcher(0)
        .fetch_html(&format!("{}/jobs", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn fetch_html_maps_404_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_fetcher(3)
        .fetch_html(&format!("{}/jobs", server.uri()))
        .await;
    assert!(matches!(result, Err(ScraperError::NotFound { .. })));
}

#[tokio::test]
async fn fetch_html_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = test_fetcher(2)
        .fetch_html(&format!("{}/jobs", server.uri()))
        .await;
    assert!(matches!(
        result,
        Err(ScraperError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn fetch_html_reports_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let result = test_fetcher(0)
        .fetch_html(&format!("{}/jobs", server.uri()))
        .await;
    assert!(matches!(
        result,
        Err(ScraperError::RateLimited {
            retry_after_secs: 7,
            ..
        })
    ));
}

#[tokio::test]
async fn fetch_html_rejects_invalid_url_before_request() {
    let result = test_fetcher(3).fetch_html("jobs-page-1").await;
    assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
}
