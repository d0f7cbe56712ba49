//! CSV output handler
//!
//! Writes records to a comma-delimited UTF-8 file with the header
//! `text,author,tags`. Tags share a single cell, joined with `;`.

use crate::output::traits::{OutputResult, Record, RecordSink};
use std::path::{Path, PathBuf};

/// Header row of the CSV file
pub const CSV_HEADER: [&str; 3] = ["text", "author", "tags"];

/// Sink that writes records to a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing to `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn write_records(&mut self, records: &[Record]) -> OutputResult<usize> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADER)?;

        for record in records {
            let tags = record.tags_cell();
            writer.write_record([record.text.as_str(), record.author.as_str(), tags.as_str()])?;
        }

        writer.flush()?;
        tracing::debug!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
