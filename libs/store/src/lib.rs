//! # rowkey-store
//!
//! Owns a data snapshot together with its live format registry and the
//! baseline registry the snapshot was last keyed under.
//!
//! - Id generation and row inserts are serialized per table.
//! - A migration takes the store's write lock for its whole run, so no
//!   insert or format change can interleave with it.
//! - A migration only runs with a [`Confirmation`] built from the exact
//!   plan it is about to execute.
//!
//! The store never persists anything; callers write [`Store::into_parts`]
//! back to wherever the data lives.

mod error;
mod store;

pub use error::StoreError;
pub use store::{Confirmation, Store, StoreParts};
