//! Migration errors.

use thiserror::Error;

/// Reasons a migration run is rejected.
///
/// A failed run leaves the input snapshot untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// Two rows share a primary key, so references to it are ambiguous.
    #[error("table '{table}' has duplicate primary key '{id}'; references to it cannot be remapped")]
    DuplicateKey { table: String, id: String },

    /// The table has rows but no schema to name its primary key.
    #[error("table '{table}' has rows but no schema; cannot determine its primary key")]
    MissingSchema { table: String },

    /// A format entry could not be serialized for hashing.
    #[error("format for table '{table}' cannot be hashed: {reason}")]
    UnhashableFormat { table: String, reason: String },
}

impl MigrationError {
    /// The table the error concerns.
    pub fn table(&self) -> &str {
        match self {
            Self::DuplicateKey { table, .. }
            | Self::MissingSchema { table }
            | Self::UnhashableFormat { table, .. } => table,
        }
    }
}
