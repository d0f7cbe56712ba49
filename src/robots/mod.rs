//! Robots.txt handling module
//!
//! This module fetches and evaluates the robots.txt of the crawl origin once,
//! before the first page is requested.

mod parser;

pub use parser::ParsedRobots;

use crate::url::robots_url;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Decides whether the crawler may fetch the origin at all
#[async_trait]
pub trait PermissionCheck: Send + Sync {
    /// Returns true when `user_agent` may fetch `origin`
    async fn is_allowed(&self, origin: &Url, user_agent: &str) -> bool;
}

/// Fetches robots.txt for an origin
///
/// A single attempt is made. Status handling:
///
/// | Response | Result |
/// |----------|--------|
/// | 2xx, UTF-8 body | rules from the body |
/// | 2xx, undecodable body | `Err` |
/// | 401, 403 | `DisallowAll` |
/// | other 4xx | `AllowAll` |
/// | 5xx, network error | `Err` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The crawl origin; robots.txt is resolved against it
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched robots.txt
/// * `Err(HarvestError)` - The rules could not be retrieved
pub async fn fetch_robots(client: &Client, origin: &Url) -> Result<ParsedRobots, HarvestError> {
    let location = robots_url(origin)?;
    tracing::debug!("Fetching robots.txt from {}", location);

    let response = client.get(location.as_str()).send().await?;
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        let body = std::str::from_utf8(&bytes).map_err(|e| {
            HarvestError::Robots(format!("{} is not valid UTF-8: {}", location, e))
        })?;
        return Ok(ParsedRobots::from_content(body));
    }

    match status.as_u16() {
        401 | 403 => Ok(ParsedRobots::disallow_all()),
        400..=499 => Ok(ParsedRobots::allow_all()),
        _ => Err(HarvestError::Robots(format!(
            "{} answered HTTP {}",
            location, status
        ))),
    }
}

/// Permission check backed by the origin's robots.txt
///
/// Fails open: when the rules cannot be retrieved the crawl is allowed.
#[derive(Debug, Clone)]
pub struct RobotsChecker {
    client: Client,
}

impl RobotsChecker {
    /// Creates a checker that fetches robots.txt with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PermissionCheck for RobotsChecker {
    async fn is_allowed(&self, origin: &Url, user_agent: &str) -> bool {
        match fetch_robots(&self.client, origin).await {
            Ok(robots) => robots.is_allowed(origin.as_str(), user_agent),
            Err(e) => {
                tracing::warn!(
                    "robots.txt unavailable for {} ({}), proceeding as allowed",
                    origin,
                    e
                );
                true
            }
        }
    }
}
