//! Best-effort parsing of the free-text salary and posting-date fields.
//!
//! Neither parser ever fails: unparseable salaries become `0..0` ("not
//! disclosed") and unparseable dates become the harvest time.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jobharvest_core::SalaryRange;
use regex::Regex;

use crate::normalize::clean_text;

/// One lakh, the unit Indian job boards quote annual salaries in.
const LAKH: f64 = 100_000.0;

/// Added to a lone salary figure to form an upper bound.
const SINGLE_FIGURE_SPREAD: u64 = 10_000;

/// Oldest age a relative phrase may express; anything beyond is treated as
/// unparseable.
const MAX_RELATIVE_AGE_DAYS: i64 = 100 * 365;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid number regex"));

static LAKH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\d\s*l\b|\blakhs?\b|\blacs?\b|\blpa\b)").expect("valid lakh regex")
});

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?|one)\s*\+?\s*(minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?|yrs?|h|d|w|m|y)\b",
    )
    .expect("valid relative-date regex")
});

const NOW_PHRASES: [&str; 7] = [
    "just now",
    "just posted",
    "recently",
    "today",
    "few hours ago",
    "moments ago",
    "few seconds ago",
];

const DATE_PREFIXES: [&str; 5] = ["posted on", "posted", "reposted", "active", "on"];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Parses a salary string into a `min..max` range.
///
/// - No digits at all → `0..0`.
/// - The first two numeric groups (thousands separators allowed) become
///   `min` and `max`; a single group yields `max = min + 10000`.
/// - A lakh marker (`5L`, `lakh`, `lacs`, `LPA`) scales every figure by 100 000.
///
/// This is a heuristic tuned for INR listings: a `USD` range parses its
/// digits but never gets currency conversion.
#[must_use]
pub fn extract_salary(text: &str) -> SalaryRange {
    let figures: Vec<f64> = NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .take(2)
        .collect();

    let Some(&first) = figures.first() else {
        return SalaryRange::default();
    };

    let scale = if LAKH_RE.is_match(text) { LAKH } else { 1.0 };
    let min = to_whole_units(first * scale);
    let max = figures
        .get(1)
        .map_or(min.saturating_add(SINGLE_FIGURE_SPREAD), |&second| {
            to_whole_units(second * scale)
        });

    SalaryRange { min, max }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_whole_units(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Converts a platform's posting-date text into an absolute timestamp.
///
/// Understands relative phrases ("3 days ago", "an hour ago", "30+ days
/// ago", "5d", "2w", "1m" where `m` is months), "just now"/"today"-style
/// phrases, "yesterday", and a handful of absolute date formats. Anything
/// else, including `None` and the empty string, resolves to `now`; a
/// non-empty unparseable value is logged, never returned as an error.
/// Dates in the future are clamped to `now`. Relative phrases older than a
/// century count as unparseable.
#[must_use]
pub fn parse_job_posting_date(text: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = text else {
        return now;
    };
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return now;
    }

    let lowered = cleaned.to_lowercase();
    let lower = strip_date_prefix(&lowered);

    if NOW_PHRASES.iter().any(|p| lower.contains(p)) {
        return now;
    }
    if lower.contains("yesterday") {
        return now - Duration::days(1);
    }

    if let Some(offset) = parse_relative_offset(&lower) {
        if let Some(posted) = now.checked_sub_signed(offset) {
            return posted;
        }
    }

    if let Some(absolute) = parse_absolute_date(strip_date_prefix(&cleaned)) {
        return absolute.min(now);
    }

    tracing::warn!(text = %cleaned, "unparseable posting date; using harvest time");
    now
}

/// Drops a leading "Posted on:"-style label. Prefixes must end at a word
/// boundary so "one day ago" keeps its "on".
fn strip_date_prefix(s: &str) -> &str {
    for prefix in DATE_PREFIXES {
        let Some(head) = s.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &s[prefix.len()..];
        if rest.is_empty() || rest.starts_with([' ', ':']) {
            return rest.trim_start_matches([':', ' ']);
        }
    }
    s
}

fn parse_relative_offset(lower: &str) -> Option<Duration> {
    let caps = RELATIVE_RE.captures(lower)?;
    let amount = match &caps[1] {
        "a" | "an" | "one" => 1,
        digits => digits.parse::<i64>().ok()?,
    };

    let unit = &caps[2];
    let offset = if unit.starts_with("min") {
        Duration::try_minutes(amount)
    } else if unit.starts_with('h') {
        Duration::try_hours(amount)
    } else if unit.starts_with('d') {
        Duration::try_days(amount)
    } else if unit.starts_with('w') {
        Duration::try_weeks(amount)
    } else if unit.starts_with('m') {
        Duration::try_days(amount.checked_mul(30)?)
    } else if unit.starts_with('y') {
        Duration::try_days(amount.checked_mul(365)?)
    } else {
        None
    }?;

    (offset.num_days() <= MAX_RELATIVE_AGE_DAYS).then_some(offset)
}

fn parse_absolute_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
