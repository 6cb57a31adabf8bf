//! Per-table serialized id allocation.
//!
//! The scan-max-and-increment scheme returns the same id to every caller
//! that sees the same rows. The allocator holds a lock per table for the
//! whole computation and remembers the highest sequence it has handed out
//! per scope, so a second call that races ahead of the first row's insert
//! still gets a fresh value. The timestamp fallback goes through the same
//! mark, so two calls in one millisecond get consecutive values.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use rowkey_formats::FormatEntry;
use rowkey_snapshot::Table;
use tracing::{debug, warn};

use crate::{GeneratedId, IdError, IdGenerator};

/// Highest sequence issued per scope for one table.
#[derive(Debug, Default)]
struct TableState {
    high_water: HashMap<String, u64>,
}

/// Serializes id generation per table.
#[derive(Debug, Default)]
pub struct IdAllocator {
    generator: IdGenerator,
    tables: Mutex<HashMap<String, Arc<Mutex<TableState>>>>,
}

impl IdAllocator {
    #[must_use]
    pub fn new(generator: IdGenerator) -> Self {
        Self {
            generator,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates the next id for `table_name`.
    ///
    /// Calls for the same table run one at a time; calls for different
    /// tables do not block each other.
    pub fn allocate(
        &self,
        table_name: &str,
        table: &Table,
        format: Option<&FormatEntry>,
        manufacturer_id: Option<&str>,
    ) -> Result<GeneratedId, IdError> {
        let state = self.table_state(table_name)?;
        let mut state = state.lock().map_err(|_| poisoned(table_name))?;

        let ids = table.ids();
        let mut generated = self.generator.generate_from_ids(
            table_name,
            ids.iter().map(String::as_str),
            format,
            manufacturer_id,
        );

        if let Some(seq) = generated.sequence {
            let issued = state.high_water.entry(generated.scope.clone()).or_insert(0);
            if seq <= *issued {
                warn!(
                    table = table_name,
                    scope = %generated.scope,
                    scanned = seq,
                    issued = *issued,
                    "Snapshot is behind issued ids, skipping ahead"
                );
                generated = bump(table_name, &generated, *issued)?;
            }

            let taken: HashSet<&str> = ids.iter().map(String::as_str).collect();
            while taken.contains(generated.id.as_str()) {
                debug!(table = table_name, id = %generated.id, "Id already taken");
                generated = bump(table_name, &generated, generated.sequence.unwrap_or(seq))?;
            }

            if let Some(seq) = generated.sequence {
                *issued = seq;
            }
        }

        debug!(table = table_name, id = %generated.id, "Allocated id");
        Ok(generated)
    }

    /// Drops remembered sequences for every table.
    ///
    /// Call after ids were rewritten wholesale.
    pub fn forget_all(&self) -> Result<(), IdError> {
        let mut tables = self.tables.lock().map_err(|_| poisoned("*"))?;
        tables.clear();
        Ok(())
    }

    fn table_state(&self, table_name: &str) -> Result<Arc<Mutex<TableState>>, IdError> {
        let mut tables = self.tables.lock().map_err(|_| poisoned(table_name))?;
        Ok(tables.entry(table_name.to_string()).or_default().clone())
    }
}

/// Re-renders `generated` one past `after`.
fn bump(table: &str, generated: &GeneratedId, after: u64) -> Result<GeneratedId, IdError> {
    let next = after.checked_add(1).ok_or_else(|| IdError::Exhausted {
        table: table.to_string(),
        scope: generated.scope.clone(),
    })?;
    Ok(generated.with_sequence(next))
}

fn poisoned(table: &str) -> IdError {
    IdError::Poisoned {
        table: table.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, GeneratorConfig};
    use rowkey_snapshot::Row;
    use std::collections::HashSet;
    use std::thread;

    fn allocator() -> IdAllocator {
        let clock = FixedClock::on_date(2024, 8, 15).unwrap();
        IdAllocator::new(IdGenerator::with_clock(
            GeneratorConfig::default(),
            Arc::new(clock),
        ))
    }

    fn table_with(ids: &[&str]) -> Table {
        Table::new(["id"]).with_rows(ids.iter().map(|id| {
            let mut row = Row::new();
            row.insert("id".to_string(), serde_json::json!(id));
            row
        }))
    }

    #[test]
    fn test_repeated_calls_on_stale_snapshot_stay_unique() {
        let allocator = allocator();
        let format = FormatEntry::new("cust_", 6);
        let table = table_with(&["cust_000041"]);

        let a = allocator.allocate("customers", &table, Some(&format), None).unwrap();
        let b = allocator.allocate("customers", &table, Some(&format), None).unwrap();
        assert_eq!(a.id, "cust_000042");
        assert_eq!(b.id, "cust_000043");
    }

    #[test]
    fn test_scan_wins_when_ahead() {
        let allocator = allocator();
        let format = FormatEntry::new("cust_", 6);

        let a = allocator
            .allocate("customers", &table_with(&[]), Some(&format), None)
            .unwrap();
        assert_eq!(a.id, "cust_000001");

        let b = allocator
            .allocate("customers", &table_with(&["cust_000090"]), Some(&format), None)
            .unwrap();
        assert_eq!(b.id, "cust_000091");
    }

    #[test]
    fn test_scopes_tracked_separately() {
        let allocator = allocator();
        let format = FormatEntry::new("sk_", 0).manufacturer_dependent();
        let table = table_with(&[]);

        let a1 = allocator.allocate("stock", &table, Some(&format), Some("A")).unwrap();
        let b1 = allocator.allocate("stock", &table, Some(&format), Some("B")).unwrap();
        let a2 = allocator.allocate("stock", &table, Some(&format), Some("A")).unwrap();
        assert_eq!(a1.id, "sk_A_1");
        assert_eq!(b1.id, "sk_B_1");
        assert_eq!(a2.id, "sk_A_2");
    }

    #[test]
    fn test_forget_resets_high_water() {
        let allocator = allocator();
        let format = FormatEntry::new("c", 2);
        let table = table_with(&[]);

        allocator.allocate("customers", &table, Some(&format), None).unwrap();
        allocator.forget_all().unwrap();
        let again = allocator.allocate("customers", &table, Some(&format), None).unwrap();
        assert_eq!(again.id, "c01");
    }

    #[test]
    fn test_fallback_in_same_millisecond_stays_unique() {
        let allocator = allocator();
        let table = table_with(&[]);

        let a = allocator.allocate("widgets", &table, None, None).unwrap();
        let b = allocator.allocate("widgets", &table, None, None).unwrap();
        let millis = a.sequence.unwrap();
        assert_eq!(a.id, format!("widg_{millis}"));
        assert_eq!(b.id, format!("widg_{}", millis + 1));
    }

    #[test]
    fn test_fallback_skips_ids_already_in_table() {
        let allocator = allocator();
        let now = allocator.allocate("widgets", &table_with(&[]), None, None).unwrap();
        let millis = now.sequence.unwrap();

        let fresh = self::allocator();
        let taken = [format!("widg_{millis}"), format!("widg_{}", millis + 1)];
        let table = table_with(&[taken[0].as_str(), taken[1].as_str()]);
        let id = fresh.allocate("widgets", &table, None, None).unwrap();
        assert_eq!(id.id, format!("widg_{}", millis + 2));
    }

    #[test]
    fn test_exhausted_scope_is_an_error() {
        let allocator = allocator();
        let format = FormatEntry::new("c", 0);
        let full = format!("c{}", u64::MAX);
        let table = table_with(&[full.as_str()]);

        let err = allocator
            .allocate("customers", &table, Some(&format), None)
            .unwrap_err();
        assert_eq!(
            err,
            IdError::Exhausted {
                table: "customers".to_string(),
                scope: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_concurrent_allocation_is_unique() {
        let allocator = Arc::new(allocator());
        let table = Arc::new(table_with(&["inv_0005"]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    let format = FormatEntry::new("inv_", 4);
                    (0..25)
                        .map(|_| {
                            allocator
                                .allocate("invoices", &table, Some(&format), None)
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id.clone()), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 200);
        assert!(seen.contains("inv_0006"));
        assert!(seen.contains("inv_0205"));
    }
}
