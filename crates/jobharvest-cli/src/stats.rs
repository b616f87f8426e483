//! `stats` command: read-only summary of what the store holds.

use jobharvest_core::{AppConfig, Platform};
use jobharvest_db::{DistinctField, ListingFilter, ListingStore, PgListingStore};

/// How many distinct companies and locations to list by name.
const SAMPLE_LIMIT: usize = 10;

/// Prints listing counts per platform and the distinct companies and
/// locations. Only active listings are counted unless `include_inactive`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a query fails.
pub(crate) async fn print_stats(config: &AppConfig, include_inactive: bool) -> anyhow::Result<()> {
    let pool = jobharvest_db::connect_pool_from_config(config).await?;
    let store = PgListingStore::new(pool);
    let filter = if include_inactive {
        ListingFilter::default()
    } else {
        ListingFilter::active()
    };

    let report = collect_stats(&store, &filter).await?;
    print!("{}", report.render());
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct StatsReport {
    pub per_platform: Vec<(Platform, u64)>,
    pub companies: Vec<String>,
    pub locations: Vec<String>,
}

pub(crate) async fn collect_stats(
    store: &dyn ListingStore,
    filter: &ListingFilter,
) -> anyhow::Result<StatsReport> {
    let mut per_platform = Vec::with_capacity(Platform::ALL.len());
    for platform in Platform::ALL {
        let scoped = ListingFilter {
            platform: Some(platform),
            ..*filter
        };
        per_platform.push((platform, store.count(&scoped).await?));
    }

    Ok(StatsReport {
        per_platform,
        companies: store.distinct(DistinctField::Company, filter).await?,
        locations: store.distinct(DistinctField::Location, filter).await?,
    })
}

impl StatsReport {
    pub fn total(&self) -> u64 {
        self.per_platform.iter().map(|(_, n)| n).sum()
    }

    pub fn render(&self) -> String {
        let mut out = format!("{:<14}LISTINGS\n", "PLATFORM");
        for (platform, count) in &self.per_platform {
            out.push_str(&format!("{:<14}{count}\n", platform.as_str()));
        }
        out.push_str(&format!("{:<14}{}\n\n", "total", self.total()));
        out.push_str(&sample_line("companies", &self.companies));
        out.push_str(&sample_line("locations", &self.locations));
        out
    }
}

fn sample_line(label: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{label}: 0\n");
    }
    let shown: Vec<&str> = values.iter().take(SAMPLE_LIMIT).map(String::as_str).collect();
    let more = values.len().saturating_sub(SAMPLE_LIMIT);
    if more > 0 {
        format!("{label}: {} ({}, +{more} more)\n", values.len(), shown.join(", "))
    } else {
        format!("{label}: {} ({})\n", values.len(), shown.join(", "))
    }
}
