//! Output handler traits and types
//!
//! This module defines the record type produced by the extractor and the trait
//! interface for sinks that persist a finished crawl.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Separator used to pack a record's tags into one cell
pub const TAG_SEPARATOR: &str = ";";

/// One extracted record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// The record text
    pub text: String,

    /// The record author
    pub author: String,

    /// Tags in page order
    pub tags: Vec<String>,
}

impl Record {
    /// Creates a new record
    pub fn new(text: impl Into<String>, author: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            tags,
        }
    }

    /// Tags joined into a single cell, e.g. `love;life`
    pub fn tags_cell(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

/// Splits a tags cell back into its ordered tags
///
/// An empty cell yields no tags.
pub fn split_tags(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(TAG_SEPARATOR).map(str::to_string).collect()
}

/// Trait for sinks that persist the records of a finished crawl
///
/// A sink is invoked at most once per crawl, after the loop has ended.
pub trait RecordSink: Send {
    /// Writes every record and returns the number of rows written
    fn write_records(&mut self, records: &[Record]) -> OutputResult<usize>;

    /// Human-readable destination, used in log lines
    fn destination(&self) -> String;
}
