//! Crawler module for paginated fetching and record extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Record and next-link extraction from HTML
//! - The politeness delay between pages
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod politeness;
mod retry;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlSettings, StopReason};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use parser::{parse_page, ParsedPage, QuotesExtractor, SiteExtractor};
pub use politeness::PolitenessDelay;
pub use retry::RetryPolicy;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Check robots.txt for the origin
/// 2. Build the HTTP client
/// 3. Fetch pages, following next links up to `max_pages`
/// 4. Extract records from every page
/// 5. Write the collected records to the CSV file
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; see `stop_reason` for how it ended
/// * `Err(HarvestError)` - Setup or output failed
pub async fn crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    run_crawl(&config).await
}
