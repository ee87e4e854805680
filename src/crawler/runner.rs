//! Crawl loops over a page source
//!
//! `run_multi_page` plays the part of the browser: it loads whatever URL the
//! driver asks for, gives the page time to settle, and hands it back to the
//! driver. `scrape_single_page` extracts one page with a bounded retry.

use crate::config::CrawlerConfig;
use crate::coordinator::Reporter;
use crate::crawler::driver::{self, PageVerdict};
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::{PageLoad, PageSource};
use crate::crawler::machine::CrawlOutcome;
use crate::state::IdentifierSet;
use crate::storage::StateStore;
use crate::url::page_number;
use crate::{HarvestError, Result};
use url::Url;

/// Walks every result page of a search
///
/// Resumes a persisted crawl of the same search unless `fresh` is set. Any
/// load or extraction error ends the crawl, clears its persisted state and is
/// returned; there is no retry.
pub async fn run_multi_page<P, S>(
    source: &P,
    store: &mut S,
    extractor: &dyn LinkExtractor,
    config: &CrawlerConfig,
    start_url: &Url,
    fresh: bool,
    reporter: &Reporter,
) -> Result<CrawlOutcome>
where
    P: PageSource + ?Sized,
    S: StateStore + ?Sized,
{
    let mut url = match driver::start(store, start_url, fresh, reporter) {
        Ok(url) => url,
        Err(e) => return Err(driver::fail(store, 1, e, reporter)),
    };

    loop {
        let page = page_number(&url);
        tracing::debug!("Loading page {}: {}", page, url);

        let html = match load(source, &url, page).await {
            Ok(html) => html,
            Err(e) => return Err(driver::fail(store, page, e, reporter)),
        };

        tokio::time::sleep(config.render_settle()).await;

        match driver::on_page_loaded(store, extractor, &url, &html, config.max_pages, reporter) {
            Ok(PageVerdict::Navigate(next)) => url = next,
            Ok(PageVerdict::Completed(outcome)) => return Ok(outcome),
            Ok(PageVerdict::NotCrawling) => {
                let error = HarvestError::NavigationFailure {
                    page,
                    url: url.to_string(),
                    message: "crawl state was lost".to_string(),
                };
                return Err(driver::fail(store, page, error, reporter));
            }
            Err(e) => return Err(driver::fail(store, page, e, reporter)),
        }
    }
}

/// Extracts the usernames of a single result page
///
/// The page may still be filling in, so an empty extraction reloads it up to
/// `extraction_retries` more times, `extraction_retry_delay_ms` apart. Returns
/// `ExtractionEmpty` once the attempts run out.
pub async fn scrape_single_page<P>(
    source: &P,
    extractor: &dyn LinkExtractor,
    config: &CrawlerConfig,
    url: &Url,
    reporter: &Reporter,
) -> Result<IdentifierSet>
where
    P: PageSource + ?Sized,
{
    let page = page_number(url);
    let attempts = config.extraction_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let html = load(source, url, page).await?;
        tokio::time::sleep(config.render_settle()).await;

        let found = extractor.extract(&html);
        if !found.is_empty() {
            reporter.progress(
                page,
                found.len(),
                format!("Found {} profiles on this page", found.len()),
            );
            return Ok(found);
        }

        if attempt < attempts {
            tracing::info!(
                "No profiles found yet, retrying ({}/{})",
                attempt,
                config.extraction_retries
            );
            tokio::time::sleep(config.extraction_retry_delay()).await;
        }
    }

    Err(HarvestError::ExtractionEmpty { page })
}

async fn load<P: PageSource + ?Sized>(source: &P, url: &Url, page: u32) -> Result<String> {
    let result = source.load(url).await;

    match result {
        PageLoad::Loaded { body, .. } => Ok(body),
        failed => Err(HarvestError::NavigationFailure {
            page,
            url: url.to_string(),
            message: failed.failure().unwrap_or_default(),
        }),
    }
}
