//! # rowkey-formats
//!
//! Per-table numbering configuration for generated primary keys.
//!
//! Every logical table has a [`FormatEntry`] describing how its identifiers
//! are shaped: a verbatim prefix, a padding width for the numeric portion,
//! and whether the table is partitioned by manufacturer. The
//! [`FormatRegistry`] maps table names to entries and always resolves to a
//! usable entry, falling back to the default for unconfigured tables.
//!
//! The registry is plain data. It is passed explicitly to the generator and
//! the migration engine; nothing here holds global state.

mod entry;
mod error;
mod registry;

pub use entry::FormatEntry;
pub use error::FormatError;
pub use registry::{FormatRecord, FormatRegistry};
