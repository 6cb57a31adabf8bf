//! # rowkey-id
//!
//! Computes the next primary key for a row being inserted into a table.
//!
//! ## Schemes
//!
//! Exactly one scheme applies per call, chosen in this order:
//!
//! 1. **Manufacturer-scoped**: `{prefix}{manufacturer}_{seq}` when the table
//!    is manufacturer dependent and a manufacturer id is supplied.
//! 2. **Date-partitioned**: `{prefix}{YYYYMMDD}_{seq}` for date-significant
//!    tables whose padding is above 8. The sequence restarts every day.
//! 3. **Sequential**: `{prefix}{seq}` zero-padded to the configured width.
//!
//! Tables without any configured format get `{table[..4]}_{unix_millis}`.
//!
//! The next sequence value is always `max(existing in scope) + 1`. Ids whose
//! numeric portion does not parse are ignored rather than rejected.
//!
//! ## Concurrency
//!
//! [`IdGenerator`] is a pure function of its inputs and the clock. Two calls
//! against the same snapshot return the same id, so concurrent callers must
//! go through [`IdAllocator`], which serializes generation per table.

mod allocator;
mod clock;
mod error;
mod generator;
mod scheme;
mod sequence;

pub use allocator::IdAllocator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::IdError;
pub use generator::{GeneratedId, IdGenerator};
pub use scheme::{GeneratorConfig, Scheme, DEFAULT_DATE_PARTITIONED_TABLES};
pub use sequence::{next_in_scope, parse_sequence, zero_pad};
