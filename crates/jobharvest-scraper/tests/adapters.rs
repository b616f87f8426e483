//! End-to-end tests for the platform adapters.
//!
//! Each test serves hand-written results-page fixtures from a local
//! `wiremock` server and points the adapter at it, so no real network
//! traffic is made.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobharvest_core::{Platform, SearchQuery};
use jobharvest_scraper::{
    normalize_listing, HttpFetcher, IndeedAdapter, InternshalaAdapter, LinkedInAdapter,
    NaukriAdapter, PageDelay, PageFetcher, SourceAdapter,
};

fn fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(HttpFetcher::new(5, "jobharvest-test/0.1", 0, 0).expect("failed to build test fetcher"))
}

fn query() -> SearchQuery {
    SearchQuery {
        keywords: "Rust Developer".to_owned(),
        location: "India".to_owned(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{body}</body></html>"))
}

const LINKEDIN_PAGE: &str = r#"
<li>
  <div class="base-card">
    <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/rust-developer-at-acme-1"></a>
    <h3 class="base-search-card__title"> Rust Developer </h3>
    <h4 class="base-search-card__subtitle"><a>Acme Labs</a></h4>
    <span class="job-search-card__location">Bengaluru, Karnataka, India</span>
    <time datetime="2026-03-10">5 days ago</time>
  </div>
</li>
<li>
  <div class="base-card">
    <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/backend-engineer-at-globex-2"></a>
    <h3 class="base-search-card__title">Backend Engineer</h3>
    <h4 class="base-search-card__subtitle"><a>Globex</a></h4>
    <span class="job-search-card__location">Pune</span>
    <span class="job-search-card__salary-info">₹12,00,000 - ₹18,00,000</span>
    <time>1 week ago</time>
  </div>
</li>
"#;

const INDEED_PAGE: &str = r#"
<div class="job_seen_beacon">
  <h2 class="jobTitle"><a href="/rc/clk?jk=abc123"><span title="Senior Rust Engineer">Senior Rust Engineer</span></a></h2>
  <span data-testid="company-name">Initech</span>
  <div data-testid="text-location">Hyderabad, Telangana</div>
  <div class="salary-snippet-container">₹8,00,000 - ₹12,00,000 a year</div>
  <div class="job-snippet">Own our ingestion pipeline.</div>
  <span class="date">Posted 3 days ago</span>
</div>
"#;

const NAUKRI_PAGE: &str = r#"
<div class="srp-jobtuple-wrapper">
  <a class="title" href="https://www.naukri.com/job-listings-rust-developer-umbrella-1">Rust Developer</a>
  <a class="comp-name">Umbrella Corp</a>
  <span class="locWdth">Noida</span>
  <span class="sal">10-15 Lacs PA</span>
  <span class="job-desc">Systems programming in Rust.</span>
  <ul class="tags-gt"><li>Rust</li><li>Tokio</li><li>PostgreSQL</li></ul>
  <span class="job-post-day">Just Now</span>
</div>
"#;

const INTERNSHALA_PAGE: &str = r#"
<div class="individual_internship" data-href="/job/detail/rust-developer-job-at-hooli-42">
  <h3 class="job-internship-name"><a>Rust Developer</a></h3>
  <p class="company-name">Hooli</p>
  <div class="locations"><a>Chennai</a><a>Work from home</a></div>
  <span class="desktop">₹ 4,00,000 - 6,00,000 /year</span>
  <div class="status-success"><span>Today</span></div>
</div>
"#;

// ---------------------------------------------------------------------------
// LinkedIn
// ---------------------------------------------------------------------------

#[tokio::test]
async fn linkedin_paginates_by_offset_and_stops_on_empty_page() {
    let server = MockServer::start().await;
    let endpoint = "/jobs-guest/jobs/api/seeMoreJobPostings/search";

    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("start", "0"))
        .and(query_param("keywords", "Rust Developer"))
        .respond_with(html(LINKEDIN_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("start", "25"))
        .respond_with(html(""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("start", "50"))
        .respond_with(html(LINKEDIN_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = LinkedInAdapter::new(fetcher(), query(), PageDelay::none())
        .with_base_url(&server.uri());
    let outcome = adapter.scrape(3).await.unwrap();

    assert_eq!(adapter.platform(), Platform::LinkedIn);
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.listings.len(), 2);
    assert_eq!(outcome.listings[0].title, "Rust Developer");
    assert_eq!(outcome.listings[0].company, "Acme Labs");
    assert_eq!(outcome.listings[0].posted, "2026-03-10");
    assert_eq!(outcome.listings[1].salary, "₹12,00,000 - ₹18,00,000");
    assert_eq!(outcome.listings[1].posted, "1 week ago");
}

// ---------------------------------------------------------------------------
// Indeed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn indeed_resolves_relative_links_and_survives_failed_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", "0"))
        .and(query_param("q", "Rust Developer"))
        .and(query_param("l", "India"))
        .respond_with(html(INDEED_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", "10"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", "20"))
        .respond_with(html(INDEED_PAGE))
        .mount(&server)
        .await;

    let adapter =
        IndeedAdapter::new(fetcher(), query(), PageDelay::none()).with_base_url(&server.uri());
    let outcome = adapter.scrape(3).await.unwrap();

    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.page_errors.len(), 1);
    assert!(outcome.page_errors[0].starts_with("page 2:"));
    assert_eq!(outcome.listings.len(), 2);

    let first = &outcome.listings[0];
    assert_eq!(first.title, "Senior Rust Engineer");
    assert_eq!(first.company, "Initech");
    assert_eq!(first.apply_link, format!("{}/rc/clk?jk=abc123", server.uri()));
    assert_eq!(first.description.as_deref(), Some("Own our ingestion pipeline."));
}

// ---------------------------------------------------------------------------
// Naukri
// ---------------------------------------------------------------------------

#[tokio::test]
async fn naukri_tolerates_one_empty_page_before_stopping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rust-developer-jobs-1"))
        .respond_with(html(NAUKRI_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    for page in 2..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/rust-developer-jobs-{page}")))
            .respond_with(html("<p>No results</p>"))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/rust-developer-jobs-4"))
        .respond_with(html(NAUKRI_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let adapter =
        NaukriAdapter::new(fetcher(), query(), PageDelay::none()).with_base_url(&server.uri());
    let outcome = adapter.scrape(5).await.unwrap();

    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.listings.len(), 1);
    let listing = &outcome.listings[0];
    assert_eq!(listing.skills, vec!["Rust", "Tokio", "PostgreSQL"]);
    assert_eq!(listing.salary, "10-15 Lacs PA");
    assert_eq!(listing.posted, "Just Now");
}

// ---------------------------------------------------------------------------
// Internshala
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internshala_reads_card_level_link_and_all_locations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/rust-developer-jobs/page-1"))
        .respond_with(html(INTERNSHALA_PAGE))
        .mount(&server)
        .await;

    let adapter = InternshalaAdapter::new(fetcher(), query(), PageDelay::none())
        .with_base_url(&server.uri());
    let outcome = adapter.scrape(1).await.unwrap();

    assert_eq!(outcome.listings.len(), 1);
    let listing = &outcome.listings[0];
    assert_eq!(listing.company, "Hooli");
    assert_eq!(listing.location, "Chennai, Work from home");
    assert_eq!(
        listing.apply_link,
        format!("{}/job/detail/rust-developer-job-at-hooli-42", server.uri())
    );
}

// ---------------------------------------------------------------------------
// Adapter output through the normalizer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scraped_cards_normalize_into_storable_listings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rust-developer-jobs-1"))
        .respond_with(html(NAUKRI_PAGE))
        .mount(&server)
        .await;

    let adapter =
        NaukriAdapter::new(fetcher(), query(), PageDelay::none()).with_base_url(&server.uri());
    let outcome = adapter.scrape(1).await.unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    let listing = normalize_listing(&outcome.listings[0], Platform::Naukri, now).unwrap();
    assert_eq!(listing.unique_id, "naukri-rust-developer-umbrella-corp");
    assert_eq!(listing.salary_min, 1_000_000);
    assert_eq!(listing.salary_max, 1_500_000);
    assert_eq!(listing.posted_date, now);
    assert_eq!(listing.description, "Systems programming in Rust.");
}

#[tokio::test]
async fn unreachable_pages_are_reported_not_raised() {
    let server = MockServer::start().await;

    let adapter = InternshalaAdapter::new(fetcher(), query(), PageDelay::none())
        .with_base_url(&server.uri());
    let outcome = adapter.scrape(2).await.unwrap();

    assert!(outcome.listings.is_empty());
    assert_eq!(outcome.pages_fetched, 0);
    assert_eq!(outcome.page_errors.len(), 2);
}
