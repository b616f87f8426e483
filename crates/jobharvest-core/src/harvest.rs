use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platforms::Platform;

/// Counts for one platform within a harvest cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    /// Raw cards the adapter returned.
    pub scraped: usize,
    /// Rows inserted or updated in the store.
    pub saved: usize,
    /// Cards dropped by validation or collapsed as in-batch duplicates.
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Outcome of one harvest cycle. Returned and logged, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub platforms: BTreeMap<Platform, PlatformSummary>,
    pub total_scraped: usize,
    pub total_saved: usize,
    pub total_failed: usize,
    /// Listings removed by the retention sweep that closed the cycle.
    pub swept: u64,
    pub errors: Vec<String>,
}

impl HarvestResult {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            platforms: BTreeMap::new(),
            total_scraped: 0,
            total_saved: 0,
            total_failed: 0,
            swept: 0,
            errors: Vec::new(),
        }
    }

    /// Records a platform's summary, folding its counts into the totals and
    /// its errors (prefixed with the platform name) into the flat error list.
    pub fn record(&mut self, platform: Platform, summary: PlatformSummary) {
        self.total_scraped += summary.scraped;
        self.total_saved += summary.saved;
        self.total_failed += summary.failed;
        self.errors
            .extend(summary.errors.iter().map(|e| format!("{platform}: {e}")));
        self.platforms.insert(platform, summary);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
