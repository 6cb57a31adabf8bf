//! Snapshot errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("table '{0}' not found")]
    TableNotFound(String),
}
