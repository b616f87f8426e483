//! The narrow storage contract the harvester writes through.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobharvest_core::{NormalizedListing, Platform};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("listing not found: {unique_id}")]
    NotFound { unique_id: String },

    #[error("stored listing {unique_id} is invalid: {reason}")]
    InvalidRow { unique_id: String, reason: String },
}

/// Row filter shared by the read operations. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub platform: Option<Platform>,
    pub is_active: Option<bool>,
    /// Inclusive lower bound on `posted_date`.
    pub posted_after: Option<DateTime<Utc>>,
}

impl ListingFilter {
    #[must_use]
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, listing: &NormalizedListing) -> bool {
        self.platform.map_or(true, |p| p == listing.platform)
            && self.is_active.map_or(true, |a| a == listing.is_active)
            && self.posted_after.map_or(true, |t| listing.posted_date >= t)
    }
}

/// Columns `distinct` can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctField {
    Company,
    Location,
    JobType,
    Platform,
}

impl DistinctField {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Location => "location",
            Self::JobType => "job_type",
            Self::Platform => "platform",
        }
    }

    #[must_use]
    pub fn value_of(self, listing: &NormalizedListing) -> String {
        match self {
            Self::Company => listing.company.clone(),
            Self::Location => listing.location.clone(),
            Self::JobType => listing.job_type.clone(),
            Self::Platform => listing.platform.as_str().to_owned(),
        }
    }
}

/// Engagement counters maintained by the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingCounter {
    Views,
    Applications,
}

impl ListingCounter {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Applications => "applications",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: u64,
    pub updated: u64,
}

impl UpsertCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Persistent listing store keyed by `unique_id`.
///
/// Writes are idempotent: re-upserting a listing updates it in place and
/// never resets `views` or `applications`.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Cheap liveness probe run before every harvest cycle.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Inserts new listings and overwrites the mutable fields of existing
    /// ones, marking every written row active. Later duplicates in `listings`
    /// win over earlier ones.
    async fn bulk_upsert(&self, listings: &[NormalizedListing]) -> Result<UpsertCounts, StoreError>;

    /// Hard-deletes active listings posted strictly before `cutoff`.
    /// Returns the number of rows removed.
    async fn delete_posted_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError>;

    /// Sorted distinct values of `field` among listings matching `filter`.
    async fn distinct(
        &self,
        field: DistinctField,
        filter: &ListingFilter,
    ) -> Result<Vec<String>, StoreError>;

    /// Full-text search over title, company, description, and location,
    /// newest first. A blank `text` returns every listing matching `filter`.
    async fn search(
        &self,
        text: &str,
        filter: &ListingFilter,
        limit: u32,
    ) -> Result<Vec<NormalizedListing>, StoreError>;

    /// Adds one to `counter` and returns the new value.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no listing has `unique_id`.
    async fn increment_counter(
        &self,
        unique_id: &str,
        counter: ListingCounter,
    ) -> Result<i64, StoreError>;
}

/// Collapses listings sharing a `unique_id`, keeping the last occurrence at
/// the position of the first. Returns the survivors and how many were dropped.
#[must_use]
pub fn dedupe_last_wins(listings: &[NormalizedListing]) -> (Vec<&NormalizedListing>, usize) {
    let mut slot_by_id: HashMap<&str, usize> = HashMap::with_capacity(listings.len());
    let mut kept: Vec<&NormalizedListing> = Vec::with_capacity(listings.len());

    for listing in listings {
        match slot_by_id.get(listing.unique_id.as_str()) {
            Some(&slot) => kept[slot] = listing,
            None => {
                slot_by_id.insert(&listing.unique_id, kept.len());
                kept.push(listing);
            }
        }
    }

    let dropped = listings.len() - kept.len();
    (kept, dropped)
}
