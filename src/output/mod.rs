//! Output module for persisting crawl results
//!
//! This module handles:
//! - The `Record` type produced by the extractor
//! - The `RecordSink` trait the crawl controller writes through
//! - CSV persistence

mod csv_output;
mod traits;

pub use csv_output::{CsvSink, CSV_HEADER};
pub use traits::{split_tags, OutputError, OutputResult, Record, RecordSink, TAG_SEPARATOR};
