//! Shared fixtures for the integration tests

use profile_harvest::config::{Config, CrawlerConfig};
use wiremock::{Match, Request};

pub const SEARCH_PATH: &str = "/search";

/// Matches a result page by its `p` query parameter; no parameter is page 1
pub struct OnPage(pub u32);

impl Match for OnPage {
    fn matches(&self, request: &Request) -> bool {
        let page = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "p")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .unwrap_or(1);
        page == self.0
    }
}

/// Builds a result page listing `users`, with a next-page link if `next` is set
pub fn result_page(users: &[&str], next: Option<u32>) -> String {
    let items: String = users
        .iter()
        .map(|user| {
            format!(
                r#"<div class="result"><a data-hovercard-type="user" href="/{user}">{user}</a>
                   <a href="/{user}?tab=repositories">repos</a></div>"#
            )
        })
        .collect();

    let pagination = match next {
        Some(page) => format!(
            r#"<nav><a rel="next" aria-label="Next Page" href="/search?q=rust&type=users&p={page}">Next</a></nav>"#
        ),
        None => r#"<nav><span class="next_page disabled">Next</span></nav>"#.to_string(),
    };

    format!(
        r#"<html><head><title>Search</title></head><body>
           <header><a href="/explore">Explore</a><a href="/marketplace">Marketplace</a></header>
           <div data-testid="results-list">{items}</div>
           {pagination}
           </body></html>"#
    )
}

/// Search URL served by the mock server at `base`
pub fn search_url(base: &str) -> String {
    format!("{}{}?q=rust&type=users", base, SEARCH_PATH)
}

pub fn quick_crawler() -> CrawlerConfig {
    CrawlerConfig {
        render_settle_ms: 0,
        extraction_retries: 1,
        extraction_retry_delay_ms: 0,
        max_pages: None,
        page_timeout_secs: 5,
    }
}

/// Configuration pointing the API at `api_base`, with no delays
pub fn test_config(api_base: &str, database_path: &str, export_dir: &str) -> Config {
    toml::from_str(&format!(
        r#"
        [crawler]
        render-settle-ms = 0
        extraction-retries = 1
        extraction-retry-delay-ms = 0

        [api]
        base-url = "{api_base}"
        request-delay-ms = 0
        timeout-secs = 5

        [user-agent]
        crawler-name = "TestHarvester"
        crawler-version = "1.0"
        contact-url = "https://example.com/about"
        contact-email = "admin@example.com"

        [output]
        database-path = "{database_path}"
        export-dir = "{export_dir}"
        "#
    ))
    .expect("test config should parse")
}
