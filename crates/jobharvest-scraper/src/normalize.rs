//! Conversion from adapter output ([`RawListing`]) to the canonical
//! [`NormalizedListing`].
//!
//! Salary and date parsing are delegated to [`crate::parse`]; this module
//! owns whitespace cleanup, link resolution, and validation.

use chrono::{DateTime, Utc};
use jobharvest_core::{make_unique_id, NormalizedListing, Platform, RawListing};

use crate::parse::{extract_salary, parse_job_posting_date};

const NOT_SPECIFIED: &str = "Not specified";

/// Minimum trimmed length (exclusive) for a title or company to be kept.
const MIN_IDENTITY_CHARS: usize = 2;

/// Trims `s` and collapses every internal run of whitespace to one space.
#[must_use]
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a normalized listing is complete enough to store.
///
/// Requires non-empty `title`, `company`, `description`, and `apply_link`,
/// and more than two characters of title and company.
#[must_use]
pub fn is_valid_job(listing: &NormalizedListing) -> bool {
    let title = listing.title.trim();
    let company = listing.company.trim();

    title.chars().count() > MIN_IDENTITY_CHARS
        && company.chars().count() > MIN_IDENTITY_CHARS
        && !listing.description.trim().is_empty()
        && !listing.apply_link.trim().is_empty()
}

/// Resolves `href` against `base`, returning an absolute `http(s)` URL.
///
/// Returns `None` for empty hrefs, fragment-only anchors, `javascript:` links,
/// and anything that does not resolve to `http` or `https`.
#[must_use]
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base = reqwest::Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Normalizes one raw card for `platform`, stamped with harvest time `now`.
///
/// Returns `None` when the result fails [`is_valid_job`]; callers count
/// those as dropped rather than treating them as errors.
#[must_use]
pub fn normalize_listing(
    raw: &RawListing,
    platform: Platform,
    now: DateTime<Utc>,
) -> Option<NormalizedListing> {
    let title = clean_text(&raw.title);
    let company = clean_text(&raw.company);
    let location = non_empty_or(clean_text(&raw.location), NOT_SPECIFIED);
    let job_type = non_empty_or(clean_text(&raw.job_type), NOT_SPECIFIED);
    let apply_link = resolve_link(platform.base_url(), &raw.apply_link).unwrap_or_default();
    let skills = clean_skills(&raw.skills);

    let description = raw
        .description
        .as_deref()
        .map(clean_text)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| synthesize_description(&title, &company, &location, &skills));

    let salary = extract_salary(&raw.salary);
    let posted_date = parse_job_posting_date(Some(&raw.posted), now);

    let listing = NormalizedListing {
        unique_id: make_unique_id(platform, &title, &company),
        platform,
        title,
        company,
        location,
        job_type,
        description,
        skills,
        salary_min: salary.min,
        salary_max: salary.max,
        posted_date,
        scraped_date: now,
        apply_link,
        is_active: true,
        views: 0,
        applications: 0,
    };

    is_valid_job(&listing).then_some(listing)
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}

/// Cleans skill tags and drops blanks and case-insensitive repeats,
/// keeping first-seen order.
fn clean_skills(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .map(|s| clean_text(s))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn synthesize_description(title: &str, company: &str, location: &str, skills: &[String]) -> String {
    if title.is_empty() || company.is_empty() {
        return String::new();
    }
    let mut description = format!("{title} at {company}, {location}.");
    if !skills.is_empty() {
        description.push_str(" Skills: ");
        description.push_str(&skills.join(", "));
        description.push('.');
    }
    description
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
