//! Per-page-load crawl driver
//!
//! The driver keeps nothing in memory between pages. Every call reads the
//! crawl state back from the store, steps it through [`advance`], and writes
//! the whole record back before asking for the next page. A crawl therefore
//! survives the loader being torn down between pages, and a later run over the
//! same search picks up where the last one stopped.

use crate::coordinator::{Message, Reporter};
use crate::crawler::extractor::{find_next_page, LinkExtractor};
use crate::crawler::machine::{advance, CrawlOutcome, Step};
use crate::state::{CrawlPhase, CrawlState};
use crate::storage::StateStore;
use crate::url::{base_url, page_url};
use crate::{HarvestError, Result};
use url::Url;

/// What to do after a page was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVerdict {
    /// Load this URL next
    Navigate(Url),

    /// The crawl finished; its state has been cleared
    Completed(CrawlOutcome),

    /// No crawl of this search is underway; the page was left alone
    NotCrawling,
}

/// Starts or resumes a multi-page crawl
///
/// If a crawl of the same search (same base URL) is already persisted it is
/// resumed at its stored page with its usernames intact. Otherwise a new crawl
/// is initialized at page 1. `fresh` discards any persisted crawl first.
///
/// Returns the URL of the page to load.
pub fn start<S: StateStore + ?Sized>(
    store: &mut S,
    url: &Url,
    fresh: bool,
    reporter: &Reporter,
) -> Result<Url> {
    let base = base_url(url);

    if fresh {
        tracing::info!("Discarding any saved crawl progress");
        store.clear_crawl_state()?;
    }

    let next = match store.load_crawl_state()? {
        Some(state) if state.resumes(base.as_str()) => {
            reporter.progress(
                state.page,
                state.identifiers.len(),
                format!(
                    "Resuming multi-page scraping at page {} ({} profiles so far)...",
                    state.page,
                    state.identifiers.len()
                ),
            );
            page_url(&base, state.page)
        }
        other => {
            if let Some(stale) = other {
                tracing::info!("Replacing saved crawl of {}", stale.base_url);
            }
            store.save_crawl_state(&CrawlState::new(base.as_str()))?;
            reporter.progress(1, 0, "Starting multi-page scraping...");
            base.clone()
        }
    };

    // A new crawl may start from any phase a previous run left behind.
    store.save_crawl_phase(CrawlPhase::PageFetching)?;

    Ok(next)
}

/// Handles one loaded result page
///
/// # Arguments
///
/// * `store` - The durable store holding the crawl state
/// * `extractor` - Finds the usernames on the page
/// * `url` - The URL the page was loaded from
/// * `html` - The page content, after it had time to settle
/// * `max_pages` - Last page to visit, if limited
/// * `reporter` - Receives progress messages
pub fn on_page_loaded<S: StateStore + ?Sized>(
    store: &mut S,
    extractor: &dyn LinkExtractor,
    url: &Url,
    html: &str,
    max_pages: Option<u32>,
    reporter: &Reporter,
) -> Result<PageVerdict> {
    let state = match store.load_crawl_state()? {
        Some(state) if state.resumes(base_url(url).as_str()) => state,
        _ => {
            tracing::debug!("No crawl underway for {}", url);
            return Ok(PageVerdict::NotCrawling);
        }
    };

    enter(store, CrawlPhase::PageFetching)?;

    let page = state.page;
    let found = extractor.extract(html);
    let has_next_page = find_next_page(html, url).is_some();

    enter(store, CrawlPhase::PageExtracted)?;

    let base = base_url(url);

    match advance(state, &found, has_next_page, max_pages) {
        Step::Navigate(next) => {
            reporter.progress(
                page,
                next.identifiers.len(),
                format!(
                    "Page {}: Found {} profiles (Total: {})",
                    page,
                    found.len(),
                    next.identifiers.len()
                ),
            );

            store.save_crawl_state(&next)?;
            enter(store, CrawlPhase::Navigating)?;

            reporter.progress(
                next.page,
                next.identifiers.len(),
                format!("Moving to page {}...", next.page),
            );

            Ok(PageVerdict::Navigate(page_url(&base, next.page)))
        }
        Step::Complete(outcome) => {
            if !found.is_empty() {
                reporter.progress(
                    page,
                    outcome.identifiers.len(),
                    format!(
                        "Page {}: Found {} profiles (Total: {})",
                        page,
                        found.len(),
                        outcome.identifiers.len()
                    ),
                );
            }

            store.clear_crawl_state()?;
            enter(store, CrawlPhase::Completed)?;

            reporter.progress(
                outcome.pages,
                outcome.identifiers.len(),
                format!(
                    "Completed scanning {} pages. Found {} unique profiles.",
                    outcome.pages,
                    outcome.identifiers.len()
                ),
            );

            Ok(PageVerdict::Completed(outcome))
        }
    }
}

/// Ends a crawl on an error
///
/// Clears the persisted state so the next start does not resume into a broken
/// session, marks the crawl failed and tells the observer. Returns the error
/// for the caller to propagate.
pub fn fail<S: StateStore + ?Sized>(
    store: &mut S,
    page: u32,
    error: HarvestError,
    reporter: &Reporter,
) -> HarvestError {
    tracing::error!("Crawl failed on page {}: {}", page, error);

    if let Err(e) = store.clear_crawl_state() {
        tracing::error!("Failed to clear crawl state: {}", e);
    }
    if let Err(e) = store.save_crawl_phase(CrawlPhase::Failed) {
        tracing::error!("Failed to record crawl failure: {}", e);
    }

    reporter.send(Message::ScrapeFailed {
        page,
        message: error.to_string(),
    });

    error
}

/// Moves the stored phase marker, rejecting moves the state machine forbids
fn enter<S: StateStore + ?Sized>(store: &mut S, next: CrawlPhase) -> Result<()> {
    let current = store.load_crawl_phase()?;

    if !current.can_transition_to(next) {
        return Err(HarvestError::InvalidCrawlTransition {
            from: current,
            to: next,
        });
    }

    store.save_crawl_phase(next)?;
    Ok(())
}
