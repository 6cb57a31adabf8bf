//! The re-keying pass.

use std::collections::{HashMap, HashSet};

use rowkey_formats::FormatRegistry;
use rowkey_id::zero_pad;
use rowkey_snapshot::{key_string, References, Snapshot};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    plan, CascadeReport, MigrationError, MigrationReport, PlannedTable, TableReport,
};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// The snapshot with every planned table re-keyed.
    pub snapshot: Snapshot,
    /// Formats to diff against on the next run.
    pub baseline: FormatRegistry,
    pub report: MigrationReport,
}

/// Re-keys every table whose format changed between `old` and `new`.
///
/// Work happens on a copy of `snapshot`; on error nothing is returned and the
/// caller's snapshot is as it was. Running again with `old == new` changes
/// nothing.
pub fn migrate_all(
    snapshot: &Snapshot,
    old: &FormatRegistry,
    new: &FormatRegistry,
    references: &References,
) -> Result<MigrationOutcome, MigrationError> {
    let plan = plan(snapshot, old, new, references)?;

    let mut working = snapshot.clone();
    let mut report = MigrationReport {
        tables: Vec::with_capacity(plan.tables.len()),
        skipped: plan.skipped.clone(),
    };

    for skipped in &plan.skipped {
        debug!(table = %skipped.table, reason = %skipped.reason, "Skipping table");
    }

    for planned in &plan.tables {
        let table_report = rekey_table(&mut working, planned)?;
        info!(
            table = %planned.table,
            rows = table_report.rows,
            references = table_report.rewritten_references(),
            "Re-keyed table"
        );
        report.tables.push(table_report);
    }

    info!(
        tables = report.tables.len(),
        rows = report.rows_rekeyed(),
        "Migration complete"
    );

    Ok(MigrationOutcome {
        snapshot: working,
        baseline: new.clone(),
        report,
    })
}

fn rekey_table(
    working: &mut Snapshot,
    planned: &PlannedTable,
) -> Result<TableReport, MigrationError> {
    let mut report = TableReport {
        table: planned.table.clone(),
        rows: 0,
        mapping: Vec::with_capacity(planned.rows),
        unmapped_rows: 0,
        cascades: Vec::with_capacity(planned.cascades.len()),
    };

    let Some(table) = working.get_mut(&planned.table) else {
        return Ok(report);
    };

    let pk = planned.primary_key.as_str();
    let prefix = planned.format.prefix.as_str();
    let width = planned.format.padding as usize;
    let mut seen = HashSet::with_capacity(table.rows.len());

    for (counter, row) in (1u64..).zip(table.rows.iter_mut()) {
        let new_id = format!("{}{}", prefix, zero_pad(counter, width));
        match row.get(pk).and_then(key_string) {
            Some(old_id) => {
                if !seen.insert(old_id.clone()) {
                    return Err(MigrationError::DuplicateKey {
                        table: planned.table.clone(),
                        id: old_id,
                    });
                }
                report.mapping.push((old_id, new_id.clone()));
            }
            None => report.unmapped_rows += 1,
        }
        row.insert(pk.to_string(), Value::String(new_id));
        report.rows += 1;
    }

    if report.unmapped_rows > 0 {
        warn!(
            table = %planned.table,
            rows = report.unmapped_rows,
            "Rows without a primary key were given new ids but cannot be referenced"
        );
    }

    let lookup: HashMap<&str, &str> = report
        .mapping
        .iter()
        .map(|(old, new)| (old.as_str(), new.as_str()))
        .collect();

    let mut cascades = Vec::with_capacity(planned.cascades.len());
    for reference in &planned.cascades {
        let target = working
            .get_mut(&reference.table)
            .filter(|t| t.has_column(&reference.column));

        let Some(target) = target else {
            warn!(reference = %reference, "Referencing column not present, skipping");
            cascades.push(CascadeReport {
                reference: reference.clone(),
                rewritten: 0,
                applied: false,
            });
            continue;
        };

        let mut rewritten = 0;
        for row in &mut target.rows {
            let Some(cell) = row.get_mut(&reference.column) else {
                continue;
            };
            let replacement = key_string(cell).and_then(|old| lookup.get(old.as_str()).copied());
            if let Some(new_id) = replacement {
                *cell = Value::String(new_id.to_string());
                rewritten += 1;
            }
        }

        debug!(reference = %reference, rewritten, "Rewrote references");
        cascades.push(CascadeReport {
            reference: reference.clone(),
            rewritten,
            applied: true,
        });
    }

    report.cascades = cascades;
    Ok(report)
}
