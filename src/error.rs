//! Error taxonomy for schedule aggregation
//!
//! File access failures are always fatal. Malformed records are fatal unless
//! the caller asked for them to be skipped.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// What the aggregator was trying to do with a file when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileAction::Read => f.write_str("reading"),
            FileAction::Write => f.write_str("writing"),
        }
    }
}

/// Errors produced while aggregating a schedule file
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Cannot open {} for {action}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        action: FileAction,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record on line {line_number}: expected at least 3 tab-separated fields, got {field_count}: '{line}'")]
    MalformedRecord {
        line_number: u64,
        field_count: usize,
        line: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AggregateError {
    /// True for the record-level errors that a skip policy may recover from
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, AggregateError::MalformedRecord { .. })
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;
