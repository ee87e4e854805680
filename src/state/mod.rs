//! State module for tracking harvest progress
//!
//! This module provides the records that survive between page loads and
//! between runs.
//!
//! # Components
//!
//! - `CrawlState`: The search being walked, its current page, and the usernames collected so far
//! - `CrawlPhase`: Where the crawl state machine currently is
//! - `IdentifierSet`: An insertion-ordered set of usernames
//! - `FetchStatus`: Progress of the profile fetch batch

mod crawl_state;
mod fetch_status;
mod identifier_set;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState};
pub use fetch_status::{FetchPhase, FetchStatus};
pub use identifier_set::IdentifierSet;
