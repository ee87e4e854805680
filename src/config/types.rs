use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Profile-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
}

/// Search result crawl behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Time to let a freshly loaded page settle before extracting (milliseconds)
    #[serde(rename = "render-settle-ms", default = "default_render_settle_ms")]
    pub render_settle_ms: u64,

    /// Extra extraction attempts in single-page mode while the page is still rendering
    #[serde(rename = "extraction-retries", default = "default_extraction_retries")]
    pub extraction_retries: u32,

    /// Delay between single-page extraction attempts (milliseconds)
    #[serde(
        rename = "extraction-retry-delay-ms",
        default = "default_extraction_retry_delay_ms"
    )]
    pub extraction_retry_delay_ms: u64,

    /// Last result page to visit; unlimited when absent
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Whole-request timeout for loading a result page (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

/// Profile API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Root of the REST API; profiles are read from `{base-url}/users/{login}`
    #[serde(rename = "base-url", default = "default_api_base_url")]
    pub base_url: String,

    /// Minimum time between consecutive profile requests (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for harvester-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite state database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory that receives the dated CSV exports
    #[serde(rename = "export-dir")]
    pub export_dir: String,
}

/// Default search to harvest when none is given on the command line
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub url: String,
}

fn default_render_settle_ms() -> u64 {
    1000
}

fn default_extraction_retries() -> u32 {
    3
}

fn default_extraction_retry_delay_ms() -> u64 {
    2000
}

fn default_page_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_delay_ms() -> u64 {
    1200
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            render_settle_ms: default_render_settle_ms(),
            extraction_retries: default_extraction_retries(),
            extraction_retry_delay_ms: default_extraction_retry_delay_ms(),
            max_pages: None,
            page_timeout_secs: default_page_timeout_secs(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CrawlerConfig {
    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn extraction_retry_delay(&self) -> Duration {
        Duration::from_millis(self.extraction_retry_delay_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl ApiConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
