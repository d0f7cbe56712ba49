//! Robots.txt parser implementation
//!
//! This module provides functionality for evaluating robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
///
/// Besides published rules, a robots.txt answer can also mean "everything is
/// allowed" (nothing published) or "everything is forbidden" (access refused).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRobots {
    /// No rules apply; every URL may be fetched
    AllowAll,
    /// The server refused access to its rules; no URL may be fetched
    DisallowAll,
    /// Raw robots.txt content, evaluated on demand
    Rules(String),
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self::Rules(content.to_string())
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    /// Creates a ParsedRobots that forbids everything
    pub fn disallow_all() -> Self {
        Self::DisallowAll
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check, absolute or as a path (e.g., "/page.html")
    /// * `user_agent` - The robots.txt product token of the crawler
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::DisallowAll => false,
            Self::Rules(content) if content.trim().is_empty() => true,
            Self::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
