//! HTTP page loading
//!
//! This module handles loading search result pages, including:
//! - Building HTTP clients with proper user agent strings
//! - The `PageSource` seam the crawl driver loads pages through
//! - Error classification of page loads

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a page load
#[derive(Debug)]
pub enum PageLoad {
    /// Successfully loaded the page
    Loaded {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl PageLoad {
    /// Describes a failed load; None for a loaded page
    pub fn failure(&self) -> Option<String> {
        match self {
            Self::Loaded { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Something that can load a result page
///
/// Loading a page is the crawl's navigation step. The crawl driver holds no
/// state between loads, so an implementation is free to tear down whatever it
/// used to load the previous page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self, url: &Url) -> PageLoad;
}

/// Loads pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a page source whose client identifies with `user_agent` and
    /// gives up on a page after the crawler's page timeout
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler.page_timeout())?))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(&self, url: &Url) -> PageLoad {
        load_page(&self.client, url.clone()).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use profile_harvest::config::UserAgentConfig;
/// use profile_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "ProfileHarvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Loads a page with error classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Loaded |
/// | Non-2xx | HttpError |
/// | Timeout | NetworkError "Request timeout" |
/// | Connection refused | NetworkError "Connection refused" |
/// | Body read failure | NetworkError |
pub async fn load_page(client: &Client, url: Url) -> PageLoad {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    tracing::warn!("Search pages are being rate limited");
                }
                return PageLoad::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => PageLoad::Loaded { final_url, body },
                Err(e) => PageLoad::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                PageLoad::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                PageLoad::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                PageLoad::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}
