//! Bulk re-keying of primary keys after format changes.
//!
//! When a table's format changes, every row of that table gets a new primary
//! key from a simple counter (`{prefix}{n}` padded to the configured width,
//! in original row order) and every foreign-key column that references the
//! table is rewritten through the old-to-new mapping.
//!
//! # Invariants
//!
//! - Only tables whose format entry changed are touched
//! - New keys within a migrated table are `1..=N` with no gaps
//! - Foreign-key cells whose value is not an old key are left as they are
//! - A run either applies to every planned table or to none
//!
//! The counter does not reproduce the manufacturer-scoped or date-partitioned
//! shapes of freshly generated ids. Only references known to [`References`]
//! are cascaded; columns outside the naming convention and ids embedded in
//! JSON values must be declared or they keep pointing at old keys.
//!
//! [`References`]: rowkey_snapshot::References

mod digest;
mod engine;
mod error;
mod plan;
mod report;

pub use digest::{changed_tables, FormatDigest};
pub use engine::{migrate_all, MigrationOutcome};
pub use error::MigrationError;
pub use plan::{plan, MigrationPlan, PlannedTable, SkipReason, SkippedTable};
pub use report::{CascadeReport, MigrationReport, TableReport};
