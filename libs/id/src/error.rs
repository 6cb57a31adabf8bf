//! Error types for identifier allocation.

use thiserror::Error;

/// Errors that can occur when allocating identifiers.
///
/// Generation itself never fails: unconfigured tables and unparsable legacy
/// ids are recovered locally. Only the serialized allocator can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// A previous allocation for this table panicked while holding its lock.
    #[error("id allocator for table '{table}' is poisoned")]
    Poisoned { table: String },

    /// Every sequence value in the scope is taken.
    #[error("no ids left in scope '{scope}' of table '{table}'")]
    Exhausted { table: String, scope: String },
}
