//! Error types for the stint and arrivals pipeline.
//!
//! - [`CsvError`] - loading and decoding input tables
//! - [`WriteError`] - serializing and writing output tables
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Bad cell values (dates, fees) and missing join rows are not errors:
//! the transform stages degrade them to nulls or zeros and count them.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while loading an input table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Required columns are absent from the header row.
    #[error("Table '{table}' is missing required column(s): {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// A row could not be decoded.
    #[error("Table '{table}', line {line}: {message}")]
    Parse {
        table: String,
        line: u64,
        message: String,
    },

    /// Empty file.
    #[error("Table '{0}' is empty")]
    EmptyFile(String),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing the output tables.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("Output CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The in-memory writer could not be flushed into a buffer.
    #[error("Output buffer error: {0}")]
    Buffer(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Output error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// One of the six inputs is absent; nothing was read or written.
    #[error("Missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    /// Run report serialization failed.
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for output operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
