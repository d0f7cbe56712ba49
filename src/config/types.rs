use serde::Deserialize;

/// Main configuration structure for Quote-Trawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL of the site; the first page fetched and the base for next links
    pub origin: String,

    /// Maximum number of pages to fetch (unset means no limit)
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Lower bound of the politeness delay between pages (seconds)
    #[serde(rename = "min-delay-secs")]
    pub min_delay_secs: f64,

    /// Upper bound of the politeness delay between pages (seconds)
    #[serde(rename = "max-delay-secs")]
    pub max_delay_secs: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            origin: "https://quotes.toscrape.com".to_string(),
            max_pages: None,
            min_delay_secs: 1.0,
            max_delay_secs: 2.0,
            request_timeout_secs: 15,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt product token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "quote-trawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Retry policy for page requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts for one logical fetch, the first one included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff before retry n is `backoff_factor * 2^(n-1)` seconds
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,

    /// Upper bound for a single backoff wait (seconds)
    #[serde(rename = "backoff-max-secs")]
    pub backoff_max_secs: f64,

    /// Response statuses that trigger a retry
    #[serde(rename = "status-forcelist")]
    pub status_forcelist: Vec<u16>,

    /// Honor a `Retry-After` header on retryable responses
    #[serde(rename = "respect-retry-after")]
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 0.3,
            backoff_max_secs: 120.0,
            status_forcelist: vec![500, 502, 503, 504],
            respect_retry_after: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file written at the end of the crawl
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "quotes.csv".to_string(),
        }
    }
}

/// CSS selectors describing the markup of the crawled site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per record
    pub quote: String,
    /// Record text, relative to the record element
    pub text: String,
    /// Record author, relative to the record element
    pub author: String,
    /// Tag elements, relative to the record element
    pub tags: String,
    /// The "next page" anchor
    pub next: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            quote: ".quote".to_string(),
            text: ".text".to_string(),
            author: ".author".to_string(),
            tags: ".tags .tag".to_string(),
            next: "li.next > a".to_string(),
        }
    }
}
