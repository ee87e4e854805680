//! Crawl state definitions
//!
//! `CrawlState` is the durable record of a multi-page crawl. It is rebuilt from
//! the store on every page load, stepped, and written back as a whole.

use crate::state::IdentifierSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable progress of a multi-page crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlState {
    /// Whether a multi-page crawl is in progress
    pub active: bool,

    /// Search URL without the page parameter; the resumption key
    pub base_url: String,

    /// Result page the crawl is on (starts at 1)
    pub page: u32,

    /// Usernames accumulated over every page visited so far
    pub identifiers: IdentifierSet,
}

impl CrawlState {
    /// Creates the state of a crawl that has not visited any page yet
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            active: true,
            base_url: base_url.into(),
            page: 1,
            identifiers: IdentifierSet::new(),
        }
    }

    /// Returns true if this state belongs to the search identified by `base_url`
    pub fn resumes(&self, base_url: &str) -> bool {
        self.active && self.base_url == base_url
    }
}

/// Represents where the crawl state machine is
///
/// ```text
/// Idle -> PageFetching -> PageExtracted -> Navigating -> PageFetching ...
///                                       \-> Completed
///                       any active state -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    /// No crawl running
    Idle,

    /// A result page is being loaded
    PageFetching,

    /// Usernames of the current page have been merged into the state
    PageExtracted,

    /// The next result page has been requested
    Navigating,

    /// The crawl ran out of pages; results were handed off
    Completed,

    /// The crawl stopped on an error; its state was cleared
    Failed,
}

impl CrawlPhase {
    /// Checks whether moving from this phase to `next` is allowed
    ///
    /// A page load may be repeated (reload of the same page), and any phase may
    /// be reset to `Idle` when state is cleared.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (_, Idle) => true,
            (Idle | Completed | Failed, PageFetching) => true,
            (PageFetching, PageFetching | PageExtracted | Failed) => true,
            (PageExtracted, Navigating | Completed | Failed) => true,
            (Navigating, PageFetching | Failed) => true,
            _ => false,
        }
    }

    /// Converts the phase to its stored string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PageFetching => "page_fetching",
            Self::PageExtracted => "page_extracted",
            Self::Navigating => "navigating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Default for CrawlPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
