//! Persistence merger: dedupes a platform's normalized listings and writes
//! them to the store in one bulk upsert.

use jobharvest_core::{make_unique_id, NormalizedListing, Platform};
use jobharvest_db::{dedupe_last_wins, ListingStore, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows written (inserted + updated).
    pub saved: usize,
    pub inserted: u64,
    pub updated: u64,
    /// Listings dropped before the write: incomplete or duplicated in the batch.
    pub skipped: usize,
}

/// Saves one platform's listings.
///
/// Listings missing a title, company, or apply link are skipped. `unique_id`
/// is recomputed from `(platform, title, company)`, and when two listings
/// share it the later one wins. Existing rows keep their `views` and
/// `applications`; nothing is ever deleted here.
///
/// # Errors
///
/// Returns [`StoreError`] if the bulk upsert fails.
pub async fn save_listings(
    store: &dyn ListingStore,
    platform: Platform,
    listings: &[NormalizedListing],
) -> Result<MergeReport, StoreError> {
    let complete: Vec<NormalizedListing> = listings
        .iter()
        .filter(|l| {
            !l.title.trim().is_empty()
                && !l.company.trim().is_empty()
                && !l.apply_link.trim().is_empty()
        })
        .map(|l| NormalizedListing {
            unique_id: make_unique_id(platform, &l.title, &l.company),
            platform,
            is_active: true,
            ..l.clone()
        })
        .collect();
    let incomplete = listings.len() - complete.len();

    let (batch, duplicates) = dedupe_last_wins(&complete);
    let mut report = MergeReport {
        skipped: incomplete + duplicates,
        ..MergeReport::default()
    };

    if batch.is_empty() {
        tracing::debug!(%platform, skipped = report.skipped, "nothing to save");
        return Ok(report);
    }

    let batch: Vec<NormalizedListing> = batch.into_iter().cloned().collect();
    let counts = store.bulk_upsert(&batch).await?;

    report.inserted = counts.inserted;
    report.updated = counts.updated;
    report.saved = usize::try_from(counts.total()).unwrap_or(usize::MAX);

    tracing::info!(
        %platform,
        saved = report.saved,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        "listings merged"
    );
    Ok(report)
}
