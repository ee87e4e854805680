//! Profile-Harvest: a resumable GitHub user search harvester
//!
//! This crate walks the pages of a GitHub user search, collects the usernames
//! found on each page, fetches every user's public profile from the REST API
//! and exports the aggregated profiles as CSV.

pub mod config;
pub mod coordinator;
pub mod crawler;
pub mod fetch;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Profile-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No usernames found on page {page}")]
    ExtractionEmpty { page: u32 },

    #[error("Error on page {page}: failed to load {url}: {message}")]
    NavigationFailure {
        page: u32,
        url: String,
        message: String,
    },

    #[error("API rate limit exceeded. Try again later.")]
    RateLimited { login: String },

    #[error("GitHub API error: {status}")]
    Api { login: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("No usernames found. Run a search scrape first.")]
    NothingToFetch,

    #[error("The last search scrape did not finish ({phase}). Scrape again before fetching profiles.")]
    ScrapeIncomplete { phase: state::CrawlPhase },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidCrawlTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Invalid fetch transition: {from:?} -> {to:?}")]
    InvalidFetchTransition {
        from: state::FetchPhase,
        to: state::FetchPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Profile-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use fetch::ProfileRecord;
pub use state::{CrawlPhase, CrawlState, FetchPhase, FetchStatus, IdentifierSet};
pub use url::{base_url, page_url};
