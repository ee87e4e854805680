//! Output module for exporting harvest results
//!
//! This module handles:
//! - Formatting fetched profiles as CSV
//! - Writing the dated export file
//! - Summarizing stored harvest state

mod csv;
pub mod stats;

pub use csv::{export_filename, format_csv, write_export, HEADER};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use thiserror::Error;

/// Output-specific errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
