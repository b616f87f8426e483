use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platforms::Platform;

/// Maximum length of a [`NormalizedListing::unique_id`].
pub const UNIQUE_ID_MAX_LEN: usize = 100;

/// Field values exactly as an adapter pulled them off a listing card.
///
/// Nothing here is trusted: any field may be empty, and `posted` is whatever
/// the platform printed ("3 days ago", "Just now", "2024-05-01").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub job_type: String,
    pub posted: String,
    pub apply_link: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub description: Option<String>,
}

impl RawListing {
    /// Whether the card carried the three fields a listing cannot exist without.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.company.trim().is_empty()
            && !self.apply_link.trim().is_empty()
    }
}

/// Parsed salary bounds in whole currency units. `0..0` means "not disclosed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

impl SalaryRange {
    #[must_use]
    pub fn is_disclosed(&self) -> bool {
        self.min > 0 || self.max > 0
    }
}

/// The canonical record written to the listing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedListing {
    pub unique_id: String,
    pub platform: Platform,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub skills: Vec<String>,
    pub salary_min: u64,
    pub salary_max: u64,
    pub posted_date: DateTime<Utc>,
    pub scraped_date: DateTime<Utc>,
    pub apply_link: String,
    pub is_active: bool,
    /// Owned by the external API layer; the harvester never resets it.
    pub views: i64,
    /// Owned by the external API layer; the harvester never resets it.
    pub applications: i64,
}

impl NormalizedListing {
    #[must_use]
    pub fn salary(&self) -> SalaryRange {
        SalaryRange {
            min: self.salary_min,
            max: self.salary_max,
        }
    }
}

/// Builds the deterministic dedup key for a posting.
///
/// Lowercases `platform`, `title`, and `company`, turns every run of
/// non-alphanumeric characters into a single `-`, joins the three parts with
/// `-`, and truncates to [`UNIQUE_ID_MAX_LEN`] characters.
#[must_use]
pub fn make_unique_id(platform: Platform, title: &str, company: &str) -> String {
    let joined = [platform.as_str(), title, company]
        .iter()
        .map(|part| slugify(part))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated: String = joined.chars().take(UNIQUE_ID_MAX_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

fn slugify(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_id_joins_lowercased_slugs() {
        let id = make_unique_id(Platform::Naukri, "Backend Dev", "Acme");
        assert_eq!(id, "naukri-backend-dev-acme");
    }

    #[test]
    fn unique_id_collapses_punctuation_runs() {
        let id = make_unique_id(Platform::LinkedIn, "Sr. C++ / Rust  Engineer", "Foo & Bar, Inc.");
        assert_eq!(id, "linkedin-sr-c-rust-engineer-foo-bar-inc");
    }

    #[test]
    fn unique_id_is_stable_across_whitespace_and_case() {
        let a = make_unique_id(Platform::Indeed, "  Data  Analyst ", "ACME Corp");
        let b = make_unique_id(Platform::Indeed, "data analyst", "acme corp");
        assert_eq!(a, b);
    }

    #[test]
    fn unique_id_differs_by_platform() {
        let a = make_unique_id(Platform::Indeed, "Data Analyst", "Acme");
        let b = make_unique_id(Platform::Naukri, "Data Analyst", "Acme");
        assert_ne!(a, b);
    }

    #[test]
    fn unique_id_is_truncated() {
        let title = "very long title ".repeat(20);
        let id = make_unique_id(Platform::Internshala, &title, "Acme");
        assert!(id.chars().count() <= UNIQUE_ID_MAX_LEN);
        assert!(!id.ends_with('-'));
        assert!(id.starts_with("internshala-very-long-title"));
    }

    #[test]
    fn unique_id_truncation_respects_char_boundaries() {
        let title = "डेटा विश्लेषक ".repeat(20);
        let id = make_unique_id(Platform::Naukri, &title, "कंपनी");
        assert!(id.chars().count() <= UNIQUE_ID_MAX_LEN);
    }

    #[test]
    fn raw_listing_identity_requires_title_company_and_link() {
        let mut raw = RawListing {
            title: "Backend Dev".into(),
            company: "Acme".into(),
            apply_link: "https://x/1".into(),
            ..RawListing::default()
        };
        assert!(raw.has_identity());
        raw.apply_link = "   ".into();
        assert!(!raw.has_identity());
    }

    #[test]
    fn salary_range_disclosure() {
        assert!(!SalaryRange::default().is_disclosed());
        assert!(SalaryRange { min: 1, max: 0 }.is_disclosed());
    }
}
