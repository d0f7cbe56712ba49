//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the pagination loop that coordinates:
//! - The one-time robots.txt permission check
//! - Fetching each page through the resilient transport
//! - Extracting records and discovering the next page
//! - The politeness delay between pages
//! - Persisting the accumulated records once the loop is over

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, HttpFetcher, PageFetcher};
use crate::crawler::parser::{parse_page, QuotesExtractor, SiteExtractor};
use crate::crawler::politeness::PolitenessDelay;
use crate::crawler::retry::RetryPolicy;
use crate::output::{CsvSink, Record, RecordSink};
use crate::robots::{PermissionCheck, RobotsChecker};
use crate::state::CrawlState;
use crate::url::{parse_origin, resolve_link};
use crate::HarvestError;
use std::time::Duration;
use url::Url;

/// Why the crawl loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page had no usable "next" link
    Completed,
    /// robots.txt forbids crawling the origin
    PermissionDenied,
    /// Following the next link would exceed `max_pages`
    PageLimitReached { limit: u32 },
    /// A page could not be fetched after the transport's own retries
    FetchFailed { url: String, error: String },
}

/// Outcome of one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Why the loop ended
    pub stop_reason: StopReason,
    /// `Done` or `Aborted`
    pub final_state: CrawlState,
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Every record collected, in page order
    pub records: Vec<Record>,
    /// Rows handed to the sink, or None when nothing was collected
    pub rows_written: Option<usize>,
}

/// Fixed parameters of a crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// First page, and the base every next link is resolved against
    pub origin: Url,
    /// robots.txt product token
    pub robots_agent: String,
    /// Page limit; None means follow next links until they run out
    pub max_pages: Option<u32>,
    pub delay: PolitenessDelay,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            origin: parse_origin(&config.crawler.origin)?,
            robots_agent: config.user_agent.crawler_name.clone(),
            max_pages: config.crawler.max_pages,
            delay: PolitenessDelay::from_config(&config.crawler),
        })
    }
}

/// Main crawler coordinator structure
///
/// A coordinator drives exactly one crawl; `run` fails with
/// `InvalidTransition` when called a second time.
pub struct Coordinator {
    settings: CrawlSettings,
    permission: Box<dyn PermissionCheck>,
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn SiteExtractor>,
    sink: Box<dyn RecordSink>,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a coordinator wired to the network and the CSV file
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Bad origin, bad selector, or HTTP client failure
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let settings = CrawlSettings::from_config(config)?;

        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;

        let permission = RobotsChecker::new(client.clone());
        let fetcher = HttpFetcher::new(client, RetryPolicy::from_config(&config.retry));
        let extractor = QuotesExtractor::from_config(&config.selectors)?;
        let sink = CsvSink::new(&config.output.csv_path);

        Ok(Self::from_parts(
            settings,
            Box::new(permission),
            Box::new(fetcher),
            Box::new(extractor),
            Box::new(sink),
        ))
    }

    /// Creates a coordinator from explicit collaborators
    pub fn from_parts(
        settings: CrawlSettings,
        permission: Box<dyn PermissionCheck>,
        fetcher: Box<dyn PageFetcher>,
        extractor: Box<dyn SiteExtractor>,
        sink: Box<dyn RecordSink>,
    ) -> Self {
        Self {
            settings,
            permission,
            fetcher,
            extractor,
            sink,
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl
    ///
    /// 1. Checks robots.txt once for the origin
    /// 2. Fetches pages, following next links
    /// 3. Writes the accumulated records through the sink, once
    ///
    /// A fetch failure ends the loop but is not an error: the records gathered
    /// so far are still written and the report says `FetchFailed`.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        self.transition(CrawlState::CheckingPermission)?;

        let allowed = self
            .permission
            .is_allowed(&self.settings.origin, &self.settings.robots_agent)
            .await;

        let mut records = Vec::new();
        let mut pages_fetched = 0;

        let stop_reason = if allowed {
            self.transition(CrawlState::Fetching)?;
            self.crawl_pages(&mut records, &mut pages_fetched).await?
        } else {
            tracing::warn!(
                "Scraping {} is disallowed by robots.txt, exiting",
                self.settings.origin
            );
            self.transition(CrawlState::Done)?;
            StopReason::PermissionDenied
        };

        let rows_written = self.persist(&records)?;

        Ok(CrawlReport {
            stop_reason,
            final_state: self.state,
            pages_fetched,
            records,
            rows_written,
        })
    }

    /// The fetch → extract → next → delay loop
    async fn crawl_pages(
        &mut self,
        records: &mut Vec<Record>,
        pages_fetched: &mut u32,
    ) -> Result<StopReason, HarvestError> {
        let mut target = self.settings.origin.clone();
        let mut page: u32 = 1;

        loop {
            tracing::info!("Fetching page {}: {}", page, target);

            let body = match self.fetcher.fetch(&target).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Request failed: {}", e);
                    self.transition(CrawlState::Aborted)?;
                    return Ok(StopReason::FetchFailed {
                        url: target.to_string(),
                        error: e.to_string(),
                    });
                }
            };
            *pages_fetched += 1;

            self.transition(CrawlState::Extracting)?;
            let parsed = parse_page(self.extractor.as_ref(), &body);
            tracing::debug!("Page {} yielded {} records", page, parsed.records.len());
            records.extend(parsed.records);

            self.transition(CrawlState::DecidingNext)?;
            let next = match parsed.next_href {
                Some(href) => {
                    let resolved = resolve_link(&self.settings.origin, &href);
                    if resolved.is_none() {
                        tracing::debug!("Ignoring unusable next link '{}'", href);
                    }
                    resolved
                }
                None => None,
            };

            let next = match next {
                Some(next) => next,
                None => {
                    tracing::info!("No next page after page {}", page);
                    self.transition(CrawlState::Done)?;
                    return Ok(StopReason::Completed);
                }
            };

            page += 1;
            if let Some(limit) = self.settings.max_pages {
                if page > limit {
                    tracing::info!("Reached max_pages limit ({})", limit);
                    self.transition(CrawlState::Done)?;
                    return Ok(StopReason::PageLimitReached { limit });
                }
            }

            self.transition(CrawlState::Delaying)?;
            let waited = self.settings.delay.pause().await;
            tracing::debug!("Waited {:.2}s before page {}", waited.as_secs_f64(), page);

            self.transition(CrawlState::Fetching)?;
            target = next;
        }
    }

    /// Hands the records to the sink, or reports that there is nothing to save
    fn persist(&mut self, records: &[Record]) -> Result<Option<usize>, HarvestError> {
        if records.is_empty() {
            tracing::warn!("No data scraped");
            return Ok(None);
        }

        let rows = self.sink.write_records(records)?;
        tracing::info!("Saved {} rows to {}", rows, self.sink.destination());
        Ok(Some(rows))
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use quote_trawler::config::Config;
/// use quote_trawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.max_pages = Some(2);
/// let report = run_crawl(&config).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
