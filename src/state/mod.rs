//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the controller's position in the fetch → extract → next → delay loop

mod crawl_state;

pub use crawl_state::CrawlState;
