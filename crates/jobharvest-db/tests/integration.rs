//! Offline tests for jobharvest-db pool configuration and the store contract.
//! These tests do not require a live database connection.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use jobharvest_core::{AppConfig, Environment, NormalizedListing, Platform};
use jobharvest_db::{
    DistinctField, ListingCounter, ListingFilter, ListingStore, MemoryListingStore, PoolConfig,
};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        platforms_path: PathBuf::from("./config/platforms.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_min_delay_ms: 0,
        scraper_max_delay_ms: 0,
        scraper_max_retries: 3,
        scraper_retry_backoff_base_ms: 1000,
        webdriver_url: None,
        retention_days: 7,
        cycle_interval_secs: 300,
        max_concurrent_cycles: 2,
    }
}

fn listing(platform: Platform, title: &str, company: &str) -> NormalizedListing {
    let at = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
    NormalizedListing {
        unique_id: jobharvest_core::make_unique_id(platform, title, company),
        platform,
        title: title.to_string(),
        company: company.to_string(),
        location: "Bengaluru".to_string(),
        job_type: "Full-time".to_string(),
        description: format!("{title} at {company}"),
        skills: vec![],
        salary_min: 500_000,
        salary_max: 800_000,
        posted_date: at,
        scraped_date: at,
        apply_link: "https://example.com/apply".to_string(),
        is_active: true,
        views: 0,
        applications: 0,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn memory_store_works_behind_the_trait_object() {
    let store: Arc<dyn ListingStore> = Arc::new(MemoryListingStore::new());
    store.health_check().await.unwrap();

    let counts = store
        .bulk_upsert(&[
            listing(Platform::Indeed, "Platform Engineer", "Initech"),
            listing(Platform::Internshala, "Rust Intern", "Hooli"),
        ])
        .await
        .unwrap();
    assert_eq!(counts.inserted, 2);

    let id = jobharvest_core::make_unique_id(Platform::Indeed, "Platform Engineer", "Initech");
    assert_eq!(
        store.increment_counter(&id, ListingCounter::Views).await.unwrap(),
        1
    );
    assert_eq!(
        store.increment_counter(&id, ListingCounter::Views).await.unwrap(),
        2
    );

    let locations = store
        .distinct(DistinctField::Location, &ListingFilter::active())
        .await
        .unwrap();
    assert_eq!(locations, vec!["Bengaluru".to_string()]);
}
