//! Crawler module for walking search result pages
//!
//! This module contains the core crawling logic, including:
//! - Page loading over HTTP
//! - Username extraction from result pages
//! - The crawl state machine and its per-page driver
//! - Single-page and multi-page crawl loops

pub mod driver;
mod extractor;
mod fetcher;
mod machine;
mod runner;

pub use driver::PageVerdict;
pub use extractor::{find_next_page, LinkExtractor, SelectorCascade, Strategy};
pub use fetcher::{build_http_client, load_page, HttpPageSource, PageLoad, PageSource};
pub use machine::{advance, CrawlEnd, CrawlOutcome, Step};
pub use runner::{run_multi_page, scrape_single_page};
