//! Error types for format registry loading.

use thiserror::Error;

/// Errors that can occur when loading or saving a format registry.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The registry document could not be parsed.
    #[error("invalid format registry: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same table was configured twice in a list-shaped document.
    #[error("table '{0}' is configured more than once")]
    DuplicateTable(String),

    /// A table name was empty.
    #[error("format entry has an empty table name")]
    EmptyTableName,
}
