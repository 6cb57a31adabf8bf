//! Store errors.

use rowkey_id::IdError;
use rowkey_migrate::MigrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("table '{0}' has no schema; cannot place a primary key")]
    MissingSchema(String),

    /// The confirmed plan no longer matches what a migration would do.
    #[error("migration plan changed since it was confirmed; review it again")]
    StalePlan,

    #[error("store lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Id(#[from] IdError),

    #[error("migration failed, no tables were changed: {0}")]
    Migration(#[from] MigrationError),
}
