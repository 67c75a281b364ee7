//! Error types for scholargraph

use thiserror::Error;

/// A malformed field in a source row.
///
/// Row errors are per-row: the loader skips the row, counts it, and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: field '{field}' {reason}")]
pub struct RowError {
    /// Line in the source file (0 for rows without a position)
    pub line: u64,
    /// Column name, after legacy header renaming
    pub field: String,
    /// What was wrong with it
    pub reason: String,
}

/// Errors that can occur while loading or querying the graph
#[derive(Error, Debug)]
pub enum ScholarError {
    /// Backing store unreachable or authentication failure. Fatal for the run.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement was rejected or failed during execution
    #[error("Query '{statement}' failed: {message}")]
    Query { statement: String, message: String },

    /// Malformed row field
    #[error("Parse error: {0}")]
    Parse(#[from] RowError),

    /// A result did not have the shape the catalog expects
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// The load plan violates dependency ordering
    #[error("Invalid load plan: {0}")]
    Plan(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScholarError {
    /// Errors that must stop the whole run rather than the current row or task.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScholarError::Connection(_))
    }

    pub(crate) fn query(statement: impl Into<String>, message: impl Into<String>) -> Self {
        ScholarError::Query {
            statement: statement.into(),
            message: message.into(),
        }
    }
}

pub type ScholarResult<T> = Result<T, ScholarError>;
