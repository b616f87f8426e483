//! In-process [`ListingStore`] used for dry runs and tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobharvest_core::NormalizedListing;
use tokio::sync::RwLock;

use crate::store::{
    dedupe_last_wins, DistinctField, ListingCounter, ListingFilter, ListingStore, StoreError,
    UpsertCounts,
};

#[derive(Debug, Default)]
pub struct MemoryListingStore {
    listings: RwLock<HashMap<String, NormalizedListing>>,
}

impl MemoryListingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, unique_id: &str) -> Option<NormalizedListing> {
        self.listings.read().await.get(unique_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn bulk_upsert(&self, listings: &[NormalizedListing]) -> Result<UpsertCounts, StoreError> {
        let (batch, _) = dedupe_last_wins(listings);
        let mut counts = UpsertCounts::default();
        let mut stored = self.listings.write().await;

        for listing in batch {
            let mut row = listing.clone();
            row.is_active = true;
            match stored.get(&row.unique_id) {
                Some(existing) => {
                    row.views = existing.views;
                    row.applications = existing.applications;
                    counts.updated += 1;
                }
                None => {
                    row.views = 0;
                    row.applications = 0;
                    counts.inserted += 1;
                }
            }
            stored.insert(row.unique_id.clone(), row);
        }

        Ok(counts)
    }

    async fn delete_posted_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut stored = self.listings.write().await;
        let before = stored.len();
        stored.retain(|_, l| !(l.is_active && l.posted_date < cutoff));
        Ok((before - stored.len()) as u64)
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        let stored = self.listings.read().await;
        Ok(stored.values().filter(|l| filter.matches(l)).count() as u64)
    }

    async fn distinct(
        &self,
        field: DistinctField,
        filter: &ListingFilter,
    ) -> Result<Vec<String>, StoreError> {
        let stored = self.listings.read().await;
        let values: BTreeSet<String> = stored
            .values()
            .filter(|l| filter.matches(l))
            .map(|l| field.value_of(l))
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn search(
        &self,
        text: &str,
        filter: &ListingFilter,
        limit: u32,
    ) -> Result<Vec<NormalizedListing>, StoreError> {
        let terms: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        let stored = self.listings.read().await;

        let mut hits: Vec<NormalizedListing> = stored
            .values()
            .filter(|l| filter.matches(l))
            .filter(|l| {
                let haystack =
                    format!("{} {} {} {}", l.title, l.company, l.description, l.location)
                        .to_lowercase();
                terms.iter().all(|t| haystack.contains(t.as_str()))
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| {
            b.posted_date
                .cmp(&a.posted_date)
                .then_with(|| a.unique_id.cmp(&b.unique_id))
        });
        hits.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(hits)
    }

    async fn increment_counter(
        &self,
        unique_id: &str,
        counter: ListingCounter,
    ) -> Result<i64, StoreError> {
        let mut stored = self.listings.write().await;
        let listing = stored.get_mut(unique_id).ok_or_else(|| StoreError::NotFound {
            unique_id: unique_id.to_owned(),
        })?;

        let value = match counter {
            ListingCounter::Views => &mut listing.views,
            ListingCounter::Applications => &mut listing.applications,
        };
        *value += 1;
        Ok(*value)
    }
}
