//! The multi-page crawl state machine
//!
//! [`advance`] is a pure function: given the persisted state and what was
//! found on the current page, it decides whether to move to the next page or
//! finish. All I/O (loading the state, writing it back, navigating) lives in
//! the driver.

use crate::state::{CrawlState, IdentifierSet};

/// Why a crawl finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlEnd {
    /// A page yielded no usernames
    EmptyPage,

    /// A page had no link to a further page
    LastPage,

    /// The configured page limit was reached
    PageLimit,
}

/// Result of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Every username collected, in first-seen order
    pub identifiers: IdentifierSet,

    /// Number of pages that contributed usernames
    pub pages: u32,

    pub end: CrawlEnd,
}

/// The decision taken after a page was extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Persist this state and load its page
    Navigate(CrawlState),

    /// Hand off the results and drop the state
    Complete(CrawlOutcome),
}

/// Steps the crawl after a page was extracted
///
/// # Rules
///
/// - An empty page ends the crawl with what was accumulated on earlier pages;
///   it does not count as a visited page.
/// - Otherwise the page's usernames are merged into the accumulated set.
/// - The crawl moves on only when the page links to a next page and the page
///   limit (if any) has not been reached.
///
/// # Arguments
///
/// * `state` - The persisted state for the page that was just loaded
/// * `found` - Usernames extracted from that page
/// * `has_next_page` - Whether the page links to another page
/// * `max_pages` - Last page to visit, if limited
pub fn advance(
    state: CrawlState,
    found: &IdentifierSet,
    has_next_page: bool,
    max_pages: Option<u32>,
) -> Step {
    let mut state = state;

    if found.is_empty() {
        return Step::Complete(CrawlOutcome {
            identifiers: state.identifiers,
            pages: state.page.saturating_sub(1),
            end: CrawlEnd::EmptyPage,
        });
    }

    let added = state.identifiers.merge(found);
    tracing::debug!(
        "Page {}: {} found, {} new, {} total",
        state.page,
        found.len(),
        added,
        state.identifiers.len()
    );

    let at_limit = max_pages.is_some_and(|max| state.page >= max);

    if !has_next_page || at_limit {
        return Step::Complete(CrawlOutcome {
            identifiers: state.identifiers,
            pages: state.page,
            end: if has_next_page {
                CrawlEnd::PageLimit
            } else {
                CrawlEnd::LastPage
            },
        });
    }

    state.page += 1;
    Step::Navigate(state)
}
