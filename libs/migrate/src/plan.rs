//! Deciding which tables a migration run touches.

use std::fmt;

use rowkey_formats::{FormatEntry, FormatRegistry};
use rowkey_snapshot::{Reference, References, Snapshot};
use serde::Serialize;

use crate::{changed_tables, MigrationError};

/// Why a changed table is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The new registry has no entry for the table.
    NoFormat,
    /// The snapshot has no such table.
    NoData,
    /// The table has no rows.
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoFormat => "no format configured",
            Self::NoData => "no backing data",
            Self::Empty => "no rows",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: SkipReason,
}

/// A table that will be re-keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTable {
    pub table: String,
    pub primary_key: String,
    pub rows: usize,
    pub format: FormatEntry,
    /// Foreign-key columns the rename cascades to.
    pub cascades: Vec<Reference>,
}

/// The tables a run re-keys and the ones it skips, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub tables: Vec<PlannedTable>,
    pub skipped: Vec<SkippedTable>,
}

impl MigrationPlan {
    /// Returns true if the run would change nothing.
    pub fn is_noop(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total rows that would receive a new primary key.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Works out what [`crate::migrate_all`] would do, without doing it.
pub fn plan(
    snapshot: &Snapshot,
    old: &FormatRegistry,
    new: &FormatRegistry,
    references: &References,
) -> Result<MigrationPlan, MigrationError> {
    let mut plan = MigrationPlan::default();

    for name in changed_tables(old, new)? {
        let skip = |reason| SkippedTable {
            table: name.clone(),
            reason,
        };

        let Some(format) = new.get(&name) else {
            plan.skipped.push(skip(SkipReason::NoFormat));
            continue;
        };
        let Some(table) = snapshot.get(&name) else {
            plan.skipped.push(skip(SkipReason::NoData));
            continue;
        };
        if table.is_empty() {
            plan.skipped.push(skip(SkipReason::Empty));
            continue;
        }
        let Some(primary_key) = table.primary_key() else {
            return Err(MigrationError::MissingSchema { table: name });
        };

        let cascades = references
            .referencing(&name)
            .filter(|r| !(r.table == name && r.column == primary_key))
            .cloned()
            .collect();

        plan.tables.push(PlannedTable {
            primary_key: primary_key.to_string(),
            rows: table.len(),
            format: format.clone(),
            cascades,
            table: name,
        });
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkey_testing::fixtures;

    #[test]
    fn test_plan_skips_and_cascades() {
        let snapshot = fixtures::shop_snapshot();
        let old = fixtures::shop_formats();
        let mut new = old.clone();
        new.set("customers", FormatEntry::new("C", 3));
        new.set("suppliers", FormatEntry::new("sup", 2));
        new.set("notes", FormatEntry::new("n", 2));

        let references = References::by_convention(&snapshot);
        let plan = plan(&snapshot, &old, &new, &references).unwrap();

        assert_eq!(plan.tables.len(), 1);
        let customers = &plan.tables[0];
        assert_eq!(customers.table, "customers");
        assert_eq!(customers.primary_key, "id");
        assert_eq!(customers.rows, 3);
        assert_eq!(
            customers.cascades,
            vec![Reference::new("quotes", "customer_id", "customers")]
        );
        assert_eq!(
            plan.skipped,
            vec![
                SkippedTable {
                    table: "notes".to_string(),
                    reason: SkipReason::Empty
                },
                SkippedTable {
                    table: "suppliers".to_string(),
                    reason: SkipReason::NoData
                },
            ]
        );
        assert_eq!(plan.total_rows(), 3);
    }

    #[test]
    fn test_plan_removed_format_is_skipped() {
        let snapshot = fixtures::shop_snapshot();
        let old = fixtures::shop_formats();
        let new: FormatRegistry = old
            .iter()
            .filter(|(name, _)| *name != "customers")
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect();

        let plan = plan(&snapshot, &old, &new, &References::new()).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.skipped[0].reason, SkipReason::NoFormat);
    }

    #[test]
    fn test_plan_rejects_rows_without_schema() {
        let mut snapshot = fixtures::shop_snapshot();
        snapshot.get_mut("customers").unwrap().schema.clear();
        let old = fixtures::shop_formats();
        let mut new = old.clone();
        new.set("customers", FormatEntry::new("C", 3));

        let err = plan(&snapshot, &old, &new, &References::new()).unwrap_err();
        assert_eq!(err.table(), "customers");
    }
}
