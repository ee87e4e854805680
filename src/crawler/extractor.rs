//! Username extraction from search result pages
//!
//! The result page markup changes over time, so extraction runs a cascade of
//! strategies, most specific first. The first strategy that finds anything
//! wins. Every strategy funnels candidate links through
//! [`identifier_from_href`], which rejects anything that is not a single-segment
//! root-relative link or that names a reserved site route.

use crate::state::IdentifierSet;
use crate::url::identifier_from_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Containers that hold the result list in known page layouts
const RESULT_CONTAINERS: &[&str] = &[r#"div[data-testid="results-list"]"#, ".search-results"];

/// Profile links carrying a user hovercard
const HOVERCARD_LINKS: &str = r#"a[data-hovercard-type="user"]"#;

/// Root-relative links inside a result container
const RESULT_LINKS: &str = r#"a[href^="/"]"#;

/// Links that lead to the next result page, most specific first
const NEXT_PAGE_LINKS: &[&str] = &[
    r#"a[rel~="next"]"#,
    r#"a[aria-label="Next Page"]"#,
    ".next_page",
];

/// Pulls usernames out of a rendered result page
pub trait LinkExtractor: Send + Sync {
    /// Returns the usernames on the page in document order, without duplicates
    fn extract(&self, html: &str) -> IdentifierSet;
}

/// One way of locating profile links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Root-relative links inside a known result container
    ResultsList,

    /// Links marked with a user hovercard anywhere on the page
    Hovercard,

    /// Every link on the page, filtered down to profile links
    FilteredLinks,
}

impl Strategy {
    fn collect(&self, document: &Html) -> IdentifierSet {
        match self {
            Self::ResultsList => {
                let mut found = IdentifierSet::new();
                let Some(links) = selector(RESULT_LINKS) else {
                    return found;
                };
                for container in RESULT_CONTAINERS {
                    for element in select_all(document, container) {
                        found.merge(&identifiers_in(element.select(&links)));
                    }
                }
                found
            }
            Self::Hovercard => identifiers_in(select_all(document, HOVERCARD_LINKS).into_iter()),
            Self::FilteredLinks => identifiers_in(select_all(document, "a[href]").into_iter()),
        }
    }
}

/// Tries each strategy in turn and keeps the first non-empty result
#[derive(Debug, Clone)]
pub struct SelectorCascade {
    strategies: Vec<Strategy>,
}

impl SelectorCascade {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }
}

impl Default for SelectorCascade {
    fn default() -> Self {
        Self::new(vec![
            Strategy::ResultsList,
            Strategy::Hovercard,
            Strategy::FilteredLinks,
        ])
    }
}

impl LinkExtractor for SelectorCascade {
    fn extract(&self, html: &str) -> IdentifierSet {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let found = strategy.collect(&document);
            if !found.is_empty() {
                tracing::debug!("{:?} found {} usernames", strategy, found.len());
                return found;
            }
        }

        IdentifierSet::new()
    }
}

/// Looks for a link to the next result page
///
/// Returns the link target resolved against `current`, or None on the last
/// page. Disabled pagination controls are not links and are ignored.
pub fn find_next_page(html: &str, current: &Url) -> Option<Url> {
    let document = Html::parse_document(html);

    NEXT_PAGE_LINKS.iter().find_map(|pattern| {
        select_all(&document, pattern).into_iter().find_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() || href == "#" {
                return None;
            }
            current.join(href).ok()
        })
    })
}

fn selector(pattern: &str) -> Option<Selector> {
    match Selector::parse(pattern) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {}: {:?}", pattern, e);
            None
        }
    }
}

fn select_all<'a>(document: &'a Html, pattern: &str) -> Vec<ElementRef<'a>> {
    match selector(pattern) {
        Some(selector) => document.select(&selector).collect(),
        None => Vec::new(),
    }
}

fn identifiers_in<'a>(links: impl Iterator<Item = ElementRef<'a>>) -> IdentifierSet {
    links
        .filter_map(|link| link.value().attr("href"))
        .filter_map(identifier_from_href)
        .collect()
}
