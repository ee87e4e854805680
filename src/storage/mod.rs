//! Storage module for persisting harvest state
//!
//! This module handles the durable key/value store that carries a crawl across
//! page loads and runs, including:
//! - SQLite database initialization and schema management
//! - Crawl state and phase persistence
//! - Fetch status and result hand-off between stages

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{StateStore, StorageError, StorageResult};

use crate::HarvestError;
use std::path::Path;

/// Keys under which harvest records are stored
pub mod keys {
    /// Durable `CrawlState` of a multi-page crawl
    pub const CRAWL_STATE: &str = "scraping_state";

    /// Status of the profile fetch batch
    pub const FETCH_STATUS: &str = "fetch_status";

    /// Usernames handed off by the last completed scrape
    pub const IDENTIFIERS: &str = "scraped_usernames";

    /// Profiles fetched by the last successful batch
    pub const PROFILES: &str = "scraped_profiles";

    /// Crawl phase marker
    pub const CRAWL_PHASE: &str = "scraping_mode";
}

/// Opens (or creates) the state database at `path`
pub fn open_store(path: &Path) -> Result<SqliteStore, HarvestError> {
    SqliteStore::new(path)
}
