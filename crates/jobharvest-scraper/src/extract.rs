//! Multi-selector extraction of listing cards from a results page.
//!
//! Platforms reshuffle their markup often, so every field is described by an
//! ordered list of [`Extractor`] strategies and the first one that yields a
//! non-empty value wins. Card containers are probed the same way.

use jobharvest_core::RawListing;
use scraper::{ElementRef, Html, Selector};

use crate::normalize::{clean_text, resolve_link};

/// One way of pulling a string out of a listing card.
#[derive(Debug, Clone, Copy)]
pub enum Extractor {
    /// Text of the first descendant matching the selector.
    Text(&'static str),
    /// Attribute of the first descendant matching the selector.
    Attr(&'static str, &'static str),
    /// Attribute on the card element itself.
    SelfAttr(&'static str),
    /// Text of every descendant matching the selector, joined with `", "`.
    AllText(&'static str),
}

impl Extractor {
    /// Applies this strategy to `card`. Empty results count as a miss.
    #[must_use]
    pub fn apply(&self, card: ElementRef<'_>) -> Option<String> {
        let value = match *self {
            Self::Text(css) => card.select(&selector(css)?).next().map(element_text),
            Self::Attr(css, attr) => card
                .select(&selector(css)?)
                .find_map(|el| el.value().attr(attr))
                .map(clean_text),
            Self::SelfAttr(attr) => card.value().attr(attr).map(clean_text),
            Self::AllText(css) => {
                let parts: Vec<String> = card
                    .select(&selector(css)?)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .collect();
                Some(parts.join(", "))
            }
        }?;

        (!value.is_empty()).then_some(value)
    }
}

/// Selector table for one platform's results page.
#[derive(Debug, Clone, Copy)]
pub struct CardSelectors {
    /// Card container selectors, tried in order; the first that matches any
    /// element defines the cards for the whole page.
    pub cards: &'static [&'static str],
    pub title: &'static [Extractor],
    pub company: &'static [Extractor],
    pub location: &'static [Extractor],
    pub salary: &'static [Extractor],
    pub job_type: &'static [Extractor],
    pub posted: &'static [Extractor],
    pub link: &'static [Extractor],
    pub description: &'static [Extractor],
    /// Each match is one skill tag.
    pub skills: Option<&'static str>,
}

/// Extracts every listing card on `html`.
///
/// Cards with neither a title nor a link are skipped. Links are resolved
/// against `base_url`; unresolvable links are left empty and the card is
/// later dropped by validation.
#[must_use]
pub fn extract_listings(html: &str, selectors: &CardSelectors, base_url: &str) -> Vec<RawListing> {
    let document = Html::parse_document(html);

    let cards = selectors
        .cards
        .iter()
        .filter_map(|css| selector(css))
        .map(|sel| document.select(&sel).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    cards
        .into_iter()
        .filter_map(|card| extract_card(card, selectors, base_url))
        .collect()
}

fn extract_card(card: ElementRef<'_>, selectors: &CardSelectors, base_url: &str) -> Option<RawListing> {
    let title = first_value(card, selectors.title);
    let raw_link = first_value(card, selectors.link);
    if title.is_empty() && raw_link.is_empty() {
        return None;
    }

    let skills = selectors
        .skills
        .and_then(selector)
        .map(|sel| {
            card.select(&sel)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let description = first_value(card, selectors.description);

    Some(RawListing {
        title,
        company: first_value(card, selectors.company),
        location: first_value(card, selectors.location),
        salary: first_value(card, selectors.salary),
        job_type: first_value(card, selectors.job_type),
        posted: first_value(card, selectors.posted),
        apply_link: resolve_link(base_url, &raw_link).unwrap_or_default(),
        skills,
        description: (!description.is_empty()).then_some(description),
    })
}

/// First non-empty value produced by `strategies`, or an empty string.
fn first_value(card: ElementRef<'_>, strategies: &[Extractor]) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy.apply(card))
        .unwrap_or_default()
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "invalid CSS selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTORS: CardSelectors = CardSelectors {
        cards: &["div.missing", "div.card"],
        title: &[Extractor::Text("h2.new-title"), Extractor::Text("h2.title")],
        company: &[Extractor::Text(".company")],
        location: &[Extractor::AllText(".locations a")],
        salary: &[Extractor::Text(".salary")],
        job_type: &[],
        posted: &[Extractor::Attr("time", "datetime"), Extractor::Text("time")],
        link: &[Extractor::Attr("a.apply", "href"), Extractor::SelfAttr("data-href")],
        description: &[Extractor::Text(".desc")],
        skills: Some("ul.tags li"),
    };

    const PAGE: &str = r#"
        <html><body>
          <div class="card" data-href="/job/1">
            <h2 class="title">  Rust
               Engineer </h2>
            <span class="company">Acme</span>
            <div class="locations"><a>Pune</a><a>Remote</a></div>
            <time datetime="2026-03-01">2 weeks ago</time>
            <ul class="tags"><li>Rust</li><li> </li><li>SQL</li></ul>
          </div>
          <div class="card">
            <h2 class="title">Go Developer</h2>
            <a class="apply" href="https://jobs.example.com/2">Apply</a>
            <time>3 days ago</time>
            <p class="desc">Write Go.</p>
          </div>
          <div class="card"><span class="company">No title or link</span></div>
        </body></html>
    "#;

    #[test]
    fn falls_through_to_first_matching_card_selector() {
        let listings = extract_listings(PAGE, &SELECTORS, "https://jobs.example.com");
        assert_eq!(listings.len(), 2);
    }

    #[test]
    fn first_non_empty_strategy_wins() {
        let listings = extract_listings(PAGE, &SELECTORS, "https://jobs.example.com");
        assert_eq!(listings[0].title, "Rust Engineer");
        assert_eq!(listings[0].posted, "2026-03-01");
        assert_eq!(listings[1].posted, "3 days ago");
    }

    #[test]
    fn self_attr_link_is_resolved_against_base() {
        let listings = extract_listings(PAGE, &SELECTORS, "https://jobs.example.com");
        assert_eq!(listings[0].apply_link, "https://jobs.example.com/job/1");
        assert_eq!(listings[1].apply_link, "https://jobs.example.com/2");
    }

    #[test]
    fn all_text_joins_matches() {
        let listings = extract_listings(PAGE, &SELECTORS, "https://jobs.example.com");
        assert_eq!(listings[0].location, "Pune, Remote");
    }

    #[test]
    fn skills_and_description_are_optional() {
        let listings = extract_listings(PAGE, &SELECTORS, "https://jobs.example.com");
        assert_eq!(listings[0].skills, vec!["Rust".to_owned(), "SQL".to_owned()]);
        assert!(listings[0].description.is_none());
        assert!(listings[1].skills.is_empty());
        assert_eq!(listings[1].description.as_deref(), Some("Write Go."));
        assert_eq!(listings[1].company, "");
    }

    #[test]
    fn page_without_cards_yields_nothing() {
        let listings = extract_listings("<html><body><p>No jobs</p></body></html>", &SELECTORS, "https://jobs.example.com");
        assert!(listings.is_empty());
    }
}
