//! # rowkey-snapshot
//!
//! The logical contract between a data store and the identifier engine.
//!
//! A [`Snapshot`] is an in-memory copy of every table: a schema (ordered
//! column names) and an ordered list of rows. By convention the first schema
//! column is the primary key. Foreign keys are not declared by the store;
//! [`References`] discovers them from column names and lets callers add the
//! edges the convention cannot see.
//!
//! Nothing in this crate performs I/O beyond (de)serializing JSON text.

mod error;
mod naming;
mod references;
mod table;

pub use error::SnapshotError;
pub use naming::{foreign_key_column, singular};
pub use references::{Reference, References};
pub use table::{key_string, Row, Snapshot, Table};
