//! The store and its operations.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rowkey_formats::FormatRegistry;
use rowkey_id::{IdAllocator, IdGenerator};
use rowkey_migrate::{migrate_all, plan, MigrationPlan, MigrationReport};
use rowkey_snapshot::{Reference, References, Row, Snapshot, Table};
use serde_json::Value;
use tracing::{debug, info};

use crate::StoreError;

/// Acknowledgement that a specific migration plan may run.
///
/// Re-keying cannot be undone. The store refuses to migrate unless the plan
/// it computes at execution time equals the one that was confirmed.
#[derive(Debug, Clone)]
pub struct Confirmation {
    plan: MigrationPlan,
}

impl Confirmation {
    /// Confirms `plan` as reviewed.
    #[must_use]
    pub fn irreversible(plan: &MigrationPlan) -> Self {
        Self { plan: plan.clone() }
    }
}

/// Everything a caller persists after working with the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreParts {
    pub snapshot: Snapshot,
    pub formats: FormatRegistry,
    pub baseline: FormatRegistry,
}

#[derive(Debug)]
struct State {
    snapshot: Snapshot,
    formats: FormatRegistry,
    baseline: FormatRegistry,
}

/// A snapshot with serialized id allocation and exclusive migrations.
#[derive(Debug)]
pub struct Store {
    state: RwLock<State>,
    allocator: IdAllocator,
    declared: Vec<Reference>,
}

impl Store {
    /// Creates a store. `baseline` is the registry `snapshot` is keyed under.
    #[must_use]
    pub fn new(parts: StoreParts, generator: IdGenerator) -> Self {
        Self {
            state: RwLock::new(State {
                snapshot: parts.snapshot,
                formats: parts.formats,
                baseline: parts.baseline,
            }),
            allocator: IdAllocator::new(generator),
            declared: Vec::new(),
        }
    }

    /// Adds references the naming convention cannot discover.
    #[must_use]
    pub fn with_declared_references(mut self, references: impl IntoIterator<Item = Reference>) -> Self {
        self.declared.extend(references);
        self
    }

    /// Returns the next id for `table` without inserting anything.
    ///
    /// Consecutive calls never return the same id, even if no row is
    /// inserted in between.
    pub fn next_id(&self, table: &str, manufacturer_id: Option<&str>) -> Result<String, StoreError> {
        let state = self.read()?;
        let empty = Table::default();
        let rows = state.snapshot.get(table).unwrap_or(&empty);
        let generated =
            self.allocator
                .allocate(table, rows, state.formats.get(table), manufacturer_id)?;
        Ok(generated.id)
    }

    /// Inserts `row` into `table` under a freshly generated primary key.
    ///
    /// Any primary-key value already in `row` is replaced. Returns the id.
    pub fn insert_row(
        &self,
        table: &str,
        mut row: Row,
        manufacturer_id: Option<&str>,
    ) -> Result<String, StoreError> {
        let mut state = self.write()?;
        let State {
            snapshot, formats, ..
        } = &mut *state;

        let target = snapshot
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let pk = target
            .primary_key()
            .ok_or_else(|| StoreError::MissingSchema(table.to_string()))?
            .to_string();

        let generated = self
            .allocator
            .allocate(table, target, formats.get(table), manufacturer_id)?;

        row.insert(pk, Value::String(generated.id.clone()));
        target.rows.push(row);

        debug!(table, id = %generated.id, scheme = %generated.scheme, "Inserted row");
        Ok(generated.id)
    }

    /// Replaces the live format registry.
    ///
    /// Existing keys are not touched until [`Store::migrate`] runs.
    pub fn save_formats(&self, formats: FormatRegistry) -> Result<(), StoreError> {
        let mut state = self.write()?;
        info!(tables = formats.len(), "Saved format registry");
        state.formats = formats;
        Ok(())
    }

    /// Adds default formats for every table in the snapshot that has none.
    pub fn ensure_formats(&self) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let State {
            snapshot, formats, ..
        } = &mut *state;
        Ok(formats.ensure_tables(snapshot.table_names()))
    }

    pub fn formats(&self) -> Result<FormatRegistry, StoreError> {
        Ok(self.read()?.formats.clone())
    }

    pub fn baseline(&self) -> Result<FormatRegistry, StoreError> {
        Ok(self.read()?.baseline.clone())
    }

    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.read()?.snapshot.clone())
    }

    /// What [`Store::migrate`] would do right now.
    pub fn pending(&self) -> Result<MigrationPlan, StoreError> {
        let state = self.read()?;
        let references = self.references(&state.snapshot);
        Ok(plan(
            &state.snapshot,
            &state.baseline,
            &state.formats,
            &references,
        )?)
    }

    /// Re-keys every table whose format changed since the baseline.
    ///
    /// Holds the write lock for the whole run. On success the snapshot is
    /// replaced and the live formats become the new baseline; on failure
    /// nothing changes.
    pub fn migrate(&self, confirmation: Confirmation) -> Result<MigrationReport, StoreError> {
        let mut state = self.write()?;
        let references = self.references(&state.snapshot);

        let current = plan(
            &state.snapshot,
            &state.baseline,
            &state.formats,
            &references,
        )?;
        if current != confirmation.plan {
            return Err(StoreError::StalePlan);
        }

        let outcome = migrate_all(
            &state.snapshot,
            &state.baseline,
            &state.formats,
            &references,
        )?;

        state.snapshot = outcome.snapshot;
        state.baseline = outcome.baseline;
        self.allocator.forget_all()?;

        info!(
            tables = outcome.report.tables.len(),
            rows = outcome.report.rows_rekeyed(),
            "Applied migration"
        );
        Ok(outcome.report)
    }

    /// Consumes the store, returning what callers persist.
    pub fn into_parts(self) -> Result<StoreParts, StoreError> {
        let state = self.state.into_inner().map_err(|_| StoreError::Poisoned)?;
        Ok(StoreParts {
            snapshot: state.snapshot,
            formats: state.formats,
            baseline: state.baseline,
        })
    }

    fn references(&self, snapshot: &Snapshot) -> References {
        References::by_convention(snapshot).with_declared(self.declared.iter().cloned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rowkey_formats::FormatEntry;
    use rowkey_id::{FixedClock, GeneratorConfig};
    use rowkey_testing::fixtures::{self, row};
    use serde_json::json;

    fn store() -> Store {
        let clock = FixedClock::on_date(2024, 8, 15).unwrap();
        let generator = IdGenerator::with_clock(GeneratorConfig::default(), Arc::new(clock));
        Store::new(
            StoreParts {
                snapshot: fixtures::shop_snapshot(),
                formats: fixtures::shop_formats(),
                baseline: fixtures::shop_formats(),
            },
            generator,
        )
    }

    #[test]
    fn test_next_id_per_scheme() {
        let store = store();
        assert_eq!(store.next_id("customers", None).unwrap(), "cust_000044");
        assert_eq!(store.next_id("quotes", None).unwrap(), "20240815_00003");
        assert_eq!(store.next_id("stock", Some("m1")).unwrap(), "sk_m1_0003");
        assert!(store.next_id("widgets", None).unwrap().starts_with("widg_"));
    }

    #[test]
    fn test_next_id_does_not_repeat() {
        let store = store();
        let a = store.next_id("customers", None).unwrap();
        let b = store.next_id("customers", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_row_assigns_primary_key() {
        let store = store();
        let id = store
            .insert_row("customers", row(&[("name", json!("Dune Ltd"))]), None)
            .unwrap();
        assert_eq!(id, "cust_000044");

        let next = store.insert_row("customers", Row::new(), None).unwrap();
        assert_eq!(next, "cust_000045");

        let snapshot = store.snapshot().unwrap();
        let customers = snapshot.table("customers").unwrap();
        assert_eq!(customers.len(), 5);
        assert_eq!(customers.rows[3]["id"], json!("cust_000044"));
        assert_eq!(customers.rows[3]["name"], json!("Dune Ltd"));
    }

    #[test]
    fn test_insert_row_errors() {
        let store = store();
        assert!(matches!(
            store.insert_row("widgets", Row::new(), None),
            Err(StoreError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_migrate_requires_current_plan() {
        let store = store();
        let stale = store.pending().unwrap();
        assert!(stale.is_noop());

        let mut formats = store.formats().unwrap();
        formats.set("customers", FormatEntry::new("C", 3));
        store.save_formats(formats).unwrap();

        assert!(matches!(
            store.migrate(Confirmation::irreversible(&stale)),
            Err(StoreError::StalePlan)
        ));

        let plan = store.pending().unwrap();
        let report = store.migrate(Confirmation::irreversible(&plan)).unwrap();
        assert_eq!(report.rows_rekeyed(), 3);
        assert_eq!(store.baseline().unwrap(), store.formats().unwrap());
        assert!(store.pending().unwrap().is_noop());
        assert_eq!(store.next_id("customers", None).unwrap(), "C004");
    }

    #[test]
    fn test_ensure_formats() {
        let store = store();
        let mut snapshot_formats = FormatRegistry::new();
        snapshot_formats.set("customers", FormatEntry::new("cust_", 6));
        store.save_formats(snapshot_formats).unwrap();

        assert_eq!(store.ensure_formats().unwrap(), 5);
        assert!(store.formats().unwrap().get("notes").unwrap().is_default());
    }
}
