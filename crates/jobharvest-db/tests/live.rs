//! Live integration tests for `PgListingStore` using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` and are ignored by default:
//! run them with `cargo test -p jobharvest-db -- --ignored`.

use chrono::{Duration, TimeZone, Utc};
use jobharvest_core::{make_unique_id, NormalizedListing, Platform};
use jobharvest_db::{
    DistinctField, ListingCounter, ListingFilter, ListingStore, PgListingStore, StoreError,
};

fn make_listing(platform: Platform, title: &str, company: &str, posted_days_ago: i64) -> NormalizedListing {
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    NormalizedListing {
        unique_id: make_unique_id(platform, title, company),
        platform,
        title: title.to_string(),
        company: company.to_string(),
        location: "Hyderabad".to_string(),
        job_type: "Full-time".to_string(),
        description: format!("{title} building distributed systems at {company}"),
        skills: vec!["Rust".to_string(), "Kafka".to_string()],
        salary_min: 1_000_000,
        salary_max: 1_500_000,
        posted_date: now - Duration::days(posted_days_ago),
        scraped_date: now,
        apply_link: format!("https://example.com/{title}"),
        is_active: true,
        views: 0,
        applications: 0,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn bulk_upsert_inserts_then_updates_and_keeps_counters(pool: sqlx::PgPool) {
    let store = PgListingStore::new(pool);
    let listing = make_listing(Platform::Naukri, "Rust Developer", "Acme", 1);

    let first = store.bulk_upsert(std::slice::from_ref(&listing)).await.unwrap();
    assert_eq!((first.inserted, first.updated), (1, 0));

    store
        .increment_counter(&listing.unique_id, ListingCounter::Applications)
        .await
        .unwrap();

    let mut changed = listing.clone();
    changed.salary_max = 2_000_000;
    let second = store.bulk_upsert(&[changed]).await.unwrap();
    assert_eq!((second.inserted, second.updated), (0, 1));

    let found = store
        .search("rust", &ListingFilter::default(), 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].salary_max, 2_000_000);
    assert_eq!(found[0].applications, 1);
    assert_eq!(found[0].skills, vec!["Rust".to_string(), "Kafka".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn bulk_upsert_tolerates_duplicate_ids_in_one_batch(pool: sqlx::PgPool) {
    let store = PgListingStore::new(pool);
    let a = make_listing(Platform::Indeed, "SRE", "Globex", 1);
    let mut b = a.clone();
    b.location = "Remote".to_string();

    let counts = store.bulk_upsert(&[a, b]).await.unwrap();
    assert_eq!(counts.total(), 1);
    assert_eq!(
        store
            .distinct(DistinctField::Location, &ListingFilter::default())
            .await
            .unwrap(),
        vec!["Remote".to_string()]
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_posted_before_removes_only_stale_rows(pool: sqlx::PgPool) {
    let store = PgListingStore::new(pool);
    store
        .bulk_upsert(&[
            make_listing(Platform::LinkedIn, "Old Role", "Acme", 30),
            make_listing(Platform::LinkedIn, "Fresh Role", "Acme", 2),
        ])
        .await
        .unwrap();

    let cutoff = Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap();
    assert_eq!(store.delete_posted_before(cutoff).await.unwrap(), 1);
    assert_eq!(store.delete_posted_before(cutoff).await.unwrap(), 0);
    assert_eq!(store.count(&ListingFilter::default()).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn count_filters_by_platform(pool: sqlx::PgPool) {
    let store = PgListingStore::new(pool);
    store
        .bulk_upsert(&[
            make_listing(Platform::Naukri, "Backend Engineer", "Acme", 1),
            make_listing(Platform::Naukri, "Frontend Engineer", "Acme", 1),
            make_listing(Platform::Internshala, "Intern", "Hooli", 1),
        ])
        .await
        .unwrap();

    let naukri = ListingFilter::for_platform(Platform::Naukri);
    assert_eq!(store.count(&naukri).await.unwrap(), 2);
    assert_eq!(store.count(&ListingFilter::active()).await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn increment_counter_on_missing_listing_is_not_found(pool: sqlx::PgPool) {
    let store = PgListingStore::new(pool);
    let err = store
        .increment_counter("naukri-nope-nobody", ListingCounter::Views)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}
