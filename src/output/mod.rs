//! Output module for rendering crawl reports
//!
//! This module handles:
//! - Markdown summaries written to disk
//! - Terminal-friendly report printing
//! - JSON export of the full aggregate report

mod markdown;
mod text;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use text::print_report;

use crate::report::AggregateReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serializes the full aggregate report as pretty-printed JSON
pub fn format_json_report(report: &AggregateReport) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
