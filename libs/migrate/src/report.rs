//! What a migration run changed.

use rowkey_snapshot::Reference;
use serde::Serialize;

use crate::SkippedTable;

/// Rewrites applied to one foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub reference: Reference,
    /// Cells whose value was an old key and now holds the new key.
    pub rewritten: usize,
    /// False when the referencing table or column was not in the snapshot.
    pub applied: bool,
}

/// Outcome for one re-keyed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub rows: usize,
    /// `(old, new)` pairs in row order.
    pub mapping: Vec<(String, String)>,
    /// Rows that had no usable primary key before the run.
    pub unmapped_rows: usize,
    pub cascades: Vec<CascadeReport>,
}

impl TableReport {
    /// New key for an old key, if the table mapped it.
    pub fn new_id(&self, old: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(from, _)| from == old)
            .map(|(_, to)| to.as_str())
    }

    /// Total foreign-key cells rewritten for this table.
    pub fn rewritten_references(&self) -> usize {
        self.cascades.iter().map(|c| c.rewritten).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub tables: Vec<TableReport>,
    pub skipped: Vec<SkippedTable>,
}

impl MigrationReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Rows that received a new primary key.
    pub fn rows_rekeyed(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Foreign-key cells rewritten across every table.
    pub fn references_rewritten(&self) -> usize {
        self.tables.iter().map(TableReport::rewritten_references).sum()
    }
}
