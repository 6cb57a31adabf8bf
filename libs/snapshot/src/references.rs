//! Foreign-key edges between tables.
//!
//! The store does not declare relationships. An edge `other.column -> T` is
//! inferred whenever `other` has a column named [`foreign_key_column`]`(T)`.
//! References that follow any other naming (or live inside JSON blobs) are
//! invisible to the convention and must be declared explicitly.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{foreign_key_column, Snapshot};

/// A single foreign-key edge: `table.column` holds ids of `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Referencing table.
    pub table: String,
    /// Column in the referencing table.
    pub column: String,
    /// Referenced table whose primary keys the column holds.
    pub target: String,
}

impl Reference {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.table, self.column, self.target)
    }
}

/// Parses `table.column -> target`.
impl FromStr for Reference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((source, target)) = s.split_once("->") else {
            return Err(format!("expected 'table.column -> target', got '{s}'"));
        };
        let Some((table, column)) = source.trim().split_once('.') else {
            return Err(format!("missing '.' between table and column in '{s}'"));
        };
        let (table, column, target) = (table.trim(), column.trim(), target.trim());
        if table.is_empty() || column.is_empty() || target.is_empty() {
            return Err(format!("empty table, column or target in '{s}'"));
        }
        Ok(Self::new(table, column, target))
    }
}

/// The set of foreign-key edges used to cascade primary-key renames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    edges: BTreeSet<Reference>,
}

impl References {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Infers edges from column names.
    ///
    /// For every table `T` and every other table with a schema, an edge is
    /// added when that schema contains `singular(T) + "_id"`. A table never
    /// references itself by convention.
    pub fn by_convention(snapshot: &Snapshot) -> Self {
        let mut edges = BTreeSet::new();
        for target in snapshot.table_names() {
            let column = foreign_key_column(target);
            for (name, table) in snapshot.iter() {
                if name == target || !table.has_schema() {
                    continue;
                }
                if table.has_column(&column) {
                    edges.insert(Reference::new(name, column.clone(), target));
                }
            }
        }
        debug!(edges = edges.len(), "Inferred foreign-key references");
        Self { edges }
    }

    /// Adds every declared edge from `declared`.
    #[must_use]
    pub fn with_declared(mut self, declared: impl IntoIterator<Item = Reference>) -> Self {
        self.edges.extend(declared);
        self
    }

    /// Edges whose column holds ids of `target`.
    pub fn referencing<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.edges.iter().filter(move |r| r.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
