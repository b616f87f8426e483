//! Postgres-backed [`ListingStore`] over the `job_listings` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobharvest_core::{NormalizedListing, Platform};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::store::{
    dedupe_last_wins, DistinctField, ListingCounter, ListingFilter, ListingStore, StoreError,
    UpsertCounts,
};

const SEARCH_DOCUMENT: &str =
    "to_tsvector('english', title || ' ' || company || ' ' || description || ' ' || location)";

/// `$1..$3` carry the [`ListingFilter`]; a NULL parameter disables that clause.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR platform = $1) \
     AND ($2::bool IS NULL OR is_active = $2) \
     AND ($3::timestamptz IS NULL OR posted_date >= $3)";

const LISTING_COLUMNS: &str = "unique_id, platform, title, company, location, job_type, \
     description, skills, salary_min, salary_max, posted_date, scraped_date, apply_link, \
     is_active, views, applications";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub unique_id: String,
    pub platform: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub skills: Json<Vec<String>>,
    pub salary_min: i64,
    pub salary_max: i64,
    pub posted_date: DateTime<Utc>,
    pub scraped_date: DateTime<Utc>,
    pub apply_link: String,
    pub is_active: bool,
    pub views: i64,
    pub applications: i64,
}

impl TryFrom<ListingRow> for NormalizedListing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let platform: Platform = row.platform.parse().map_err(|e: jobharvest_core::CoreError| {
            StoreError::InvalidRow {
                unique_id: row.unique_id.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            unique_id: row.unique_id,
            platform,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type,
            description: row.description,
            skills: row.skills.0,
            salary_min: u64::try_from(row.salary_min).unwrap_or(0),
            salary_max: u64::try_from(row.salary_max).unwrap_or(0),
            posted_date: row.posted_date,
            scraped_date: row.scraped_date,
            apply_link: row.apply_link,
            is_active: row.is_active,
            views: row.views,
            applications: row.applications,
        })
    }
}

pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_db_amount(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        crate::ping(&self.pool).await?;
        Ok(())
    }

    /// Upserts the whole batch in one `INSERT … SELECT * FROM UNNEST(…)
    /// ON CONFLICT` round-trip. `xmax = 0` on the returned row distinguishes
    /// inserts from updates.
    async fn bulk_upsert(&self, listings: &[NormalizedListing]) -> Result<UpsertCounts, StoreError> {
        let (batch, _) = dedupe_last_wins(listings);
        if batch.is_empty() {
            return Ok(UpsertCounts::default());
        }

        let n = batch.len();
        let mut unique_ids: Vec<String> = Vec::with_capacity(n);
        let mut platforms: Vec<String> = Vec::with_capacity(n);
        let mut titles: Vec<String> = Vec::with_capacity(n);
        let mut companies: Vec<String> = Vec::with_capacity(n);
        let mut locations: Vec<String> = Vec::with_capacity(n);
        let mut job_types: Vec<String> = Vec::with_capacity(n);
        let mut descriptions: Vec<String> = Vec::with_capacity(n);
        let mut skills: Vec<serde_json::Value> = Vec::with_capacity(n);
        let mut salary_mins: Vec<i64> = Vec::with_capacity(n);
        let mut salary_maxes: Vec<i64> = Vec::with_capacity(n);
        let mut posted_dates: Vec<DateTime<Utc>> = Vec::with_capacity(n);
        let mut scraped_dates: Vec<DateTime<Utc>> = Vec::with_capacity(n);
        let mut apply_links: Vec<String> = Vec::with_capacity(n);

        for listing in batch {
            unique_ids.push(listing.unique_id.clone());
            platforms.push(listing.platform.as_str().to_owned());
            titles.push(listing.title.clone());
            companies.push(listing.company.clone());
            locations.push(listing.location.clone());
            job_types.push(listing.job_type.clone());
            descriptions.push(listing.description.clone());
            skills.push(serde_json::Value::from(listing.skills.clone()));
            salary_mins.push(to_db_amount(listing.salary_min));
            salary_maxes.push(to_db_amount(listing.salary_max));
            posted_dates.push(listing.posted_date);
            scraped_dates.push(listing.scraped_date);
            apply_links.push(listing.apply_link.clone());
        }

        let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
            "INSERT INTO job_listings \
                 (unique_id, platform, title, company, location, job_type, description, skills, \
                  salary_min, salary_max, posted_date, scraped_date, apply_link, \
                  is_active, views, applications) \
             SELECT u.*, TRUE, 0, 0 FROM UNNEST(\
                  $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
                  $7::text[], $8::jsonb[], $9::int8[], $10::int8[], $11::timestamptz[], \
                  $12::timestamptz[], $13::text[]) AS u \
             ON CONFLICT (unique_id) DO UPDATE SET \
                 platform      = EXCLUDED.platform, \
                 title         = EXCLUDED.title, \
                 company       = EXCLUDED.company, \
                 location      = EXCLUDED.location, \
                 job_type      = EXCLUDED.job_type, \
                 description   = EXCLUDED.description, \
                 skills        = EXCLUDED.skills, \
                 salary_min    = EXCLUDED.salary_min, \
                 salary_max    = EXCLUDED.salary_max, \
                 posted_date   = EXCLUDED.posted_date, \
                 scraped_date  = EXCLUDED.scraped_date, \
                 apply_link    = EXCLUDED.apply_link, \
                 is_active     = TRUE, \
                 updated_at    = NOW() \
             RETURNING (xmax = 0) AS is_new",
        )
        .bind(&unique_ids)
        .bind(&platforms)
        .bind(&titles)
        .bind(&companies)
        .bind(&locations)
        .bind(&job_types)
        .bind(&descriptions)
        .bind(&skills)
        .bind(&salary_mins)
        .bind(&salary_maxes)
        .bind(&posted_dates)
        .bind(&scraped_dates)
        .bind(&apply_links)
        .fetch_all(&self.pool)
        .await?;

        let inserted = rows.iter().filter(|&&is_new| is_new).count() as u64;
        let updated = rows.len() as u64 - inserted;

        Ok(UpsertCounts { inserted, updated })
    }

    async fn delete_posted_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let deleted = sqlx::query(
            "DELETE FROM job_listings \
             WHERE is_active = TRUE \
               AND posted_date < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM job_listings WHERE {FILTER_CLAUSE}");
        let count: i64 = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.platform.map(Platform::as_str))
            .bind(filter.is_active)
            .bind(filter.posted_after)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn distinct(
        &self,
        field: DistinctField,
        filter: &ListingFilter,
    ) -> Result<Vec<String>, StoreError> {
        let column = field.column();
        let sql = format!(
            "SELECT DISTINCT {column} FROM job_listings WHERE {FILTER_CLAUSE} ORDER BY {column}"
        );
        let values = sqlx::query_scalar::<_, String>(&sql)
            .bind(filter.platform.map(Platform::as_str))
            .bind(filter.is_active)
            .bind(filter.posted_after)
            .fetch_all(&self.pool)
            .await?;

        Ok(values)
    }

    async fn search(
        &self,
        text: &str,
        filter: &ListingFilter,
        limit: u32,
    ) -> Result<Vec<NormalizedListing>, StoreError> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM job_listings \
             WHERE {FILTER_CLAUSE} \
               AND ($4::text = '' OR {SEARCH_DOCUMENT} @@ plainto_tsquery('english', $4)) \
             ORDER BY posted_date DESC, unique_id \
             LIMIT $5"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(filter.platform.map(Platform::as_str))
            .bind(filter.is_active)
            .bind(filter.posted_after)
            .bind(text.trim())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(NormalizedListing::try_from).collect()
    }

    async fn increment_counter(
        &self,
        unique_id: &str,
        counter: ListingCounter,
    ) -> Result<i64, StoreError> {
        let column = counter.column();
        let sql = format!(
            "UPDATE job_listings SET {column} = {column} + 1, updated_at = NOW() \
             WHERE unique_id = $1 \
             RETURNING {column}"
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(unique_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                unique_id: unique_id.to_owned(),
            })
    }
}
