/// Crawl state definitions for the pagination loop
///
/// This module defines every state the crawl controller can be in and which
/// transitions between them are legal.
use std::fmt;

/// Represents the current state of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Nothing has happened yet
    Idle,

    /// Waiting on the robots.txt decision
    CheckingPermission,

    /// A page request is in flight
    Fetching,

    /// Records are being pulled out of the fetched page
    Extracting,

    /// Looking for the "next page" link
    DecidingNext,

    /// Politeness pause before the next request
    Delaying,

    // ===== Terminal States =====
    /// Crawl ended normally, by permission denial, or by the page limit
    Done,

    /// Crawl stopped because a page could not be fetched
    Aborted,
}

impl CrawlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if the controller may move from this state to `next`
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        matches!(
            (self, next),
            (Idle, CheckingPermission)
                | (CheckingPermission, Fetching)
                | (CheckingPermission, Done)
                | (Fetching, Extracting)
                | (Fetching, Aborted)
                | (Extracting, DecidingNext)
                | (DecidingNext, Delaying)
                | (DecidingNext, Done)
                | (Delaying, Fetching)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingPermission => "checking_permission",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::DecidingNext => "deciding_next",
            Self::Delaying => "delaying",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::CheckingPermission,
            Self::Fetching,
            Self::Extracting,
            Self::DecidingNext,
            Self::Delaying,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
