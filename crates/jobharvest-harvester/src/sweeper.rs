//! Retention sweep: hard-deletes listings that have aged out.

use chrono::{DateTime, Duration, Utc};
use jobharvest_core::MAX_RETENTION_DAYS;
use jobharvest_db::{ListingStore, StoreError};

/// Deletes active listings posted more than `max_age_days` before `now`.
/// Ages beyond [`MAX_RETENTION_DAYS`] are clamped to it.
///
/// Idempotent: a second sweep with the same `now` deletes nothing.
///
/// # Errors
///
/// Propagates [`StoreError`] from the store.
pub async fn sweep_old_listings(
    store: &dyn ListingStore,
    max_age_days: u32,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let max_age_days = max_age_days.min(MAX_RETENTION_DAYS);
    let cutoff = Duration::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let deleted = store.delete_posted_before(cutoff).await?;

    if deleted > 0 {
        tracing::info!(deleted, max_age_days, %cutoff, "swept stale listings");
    } else {
        tracing::debug!(max_age_days, %cutoff, "no stale listings to sweep");
    }
    Ok(deleted)
}
