//! Statistics from the harvest database
//!
//! This module provides functionality for summarizing what the state store
//! holds: a crawl in progress, the phase marker, the last fetch batch and the
//! records handed between stages.

use crate::state::{CrawlPhase, CrawlState, FetchStatus};
use crate::storage::StateStore;
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Where the crawl state machine last stood
    pub phase: CrawlPhase,

    /// The crawl in progress, if any
    pub crawl: Option<CrawlState>,

    /// Status of the last profile fetch batch
    pub fetch: Option<FetchStatus>,

    /// Usernames handed off by the last completed scrape
    pub stored_identifiers: usize,

    /// Profiles fetched by the last successful batch
    pub stored_profiles: usize,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The state store to read
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - A stored record could not be read
pub fn load_statistics<S: StateStore + ?Sized>(store: &S) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        phase: store.load_crawl_phase()?,
        crawl: store.load_crawl_state()?,
        fetch: store.load_fetch_status()?,
        stored_identifiers: store.load_identifiers()?.len(),
        stored_profiles: store.load_profiles()?.len(),
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Status ===\n");

    println!("Crawl:");
    println!("  Phase: {}", stats.phase);
    match &stats.crawl {
        Some(crawl) => {
            println!("  Search: {}", crawl.base_url);
            println!("  Next page: {}", crawl.page);
            println!("  Usernames so far: {}", crawl.identifiers.len());
        }
        None => println!("  No crawl in progress"),
    }
    println!();

    println!("Profile fetch:");
    match &stats.fetch {
        Some(status) => {
            println!("  Phase: {}", status.phase);
            println!("  Progress: {} / {}", status.current, status.total);
            println!("  Message: {}", status.message);
        }
        None => println!("  No fetch has run"),
    }
    println!();

    println!("Stored:");
    println!("  Usernames ready to fetch: {}", stats.stored_identifiers);
    println!("  Profiles ready to export: {}", stats.stored_profiles);
}
