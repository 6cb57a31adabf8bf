//! End-to-end flows through the store: insert rows under every scheme,
//! change formats, confirm and run a migration, and check references.

use std::sync::Arc;
use std::thread;

use rowkey_formats::{FormatEntry, FormatRegistry};
use rowkey_id::{FixedClock, GeneratorConfig, IdGenerator};
use rowkey_snapshot::{key_string, Reference, Row, Snapshot, Table};
use rowkey_store::{Confirmation, Store, StoreError, StoreParts};
use rowkey_testing::fixtures::{self, row};
use rstest::rstest;
use serde_json::json;

fn generator_on(year: i32, month: u32, day: u32) -> IdGenerator {
    let clock = FixedClock::on_date(year, month, day).unwrap();
    IdGenerator::with_clock(GeneratorConfig::default(), Arc::new(clock))
}

fn shop_store(generator: IdGenerator) -> Store {
    Store::new(
        StoreParts {
            snapshot: fixtures::shop_snapshot(),
            formats: fixtures::shop_formats(),
            baseline: fixtures::shop_formats(),
        },
        generator,
    )
}

fn empty_store(table: &str, schema: &[&str], format: FormatEntry) -> Store {
    let snapshot = Snapshot::new().with_table(table, Table::new(schema.iter().copied()));
    let mut formats = FormatRegistry::new();
    formats.set(table, format);
    Store::new(
        StoreParts {
            snapshot,
            formats: formats.clone(),
            baseline: formats,
        },
        generator_on(2024, 8, 15),
    )
}

#[rstest]
#[case("quotes", FormatEntry::new("", 14), None, "20240815_00001")]
#[case("stock", FormatEntry::new("sk_", 10).manufacturer_dependent(), Some("manu_0001"), "sk_manu_0001_1")]
#[case("customers", FormatEntry::new("cust_", 6), None, "cust_000001")]
fn test_first_insert_per_scheme(
    #[case] table: &str,
    #[case] format: FormatEntry,
    #[case] manufacturer: Option<&str>,
    #[case] expected: &str,
) {
    let store = empty_store(table, &["id", "name"], format);
    let id = store.insert_row(table, Row::new(), manufacturer).unwrap();
    assert_eq!(id, expected);
}

#[test]
fn test_daily_sequence_restarts_across_days() {
    let store = empty_store("quotes", &["id"], FormatEntry::new("", 14));
    for _ in 0..3 {
        store.insert_row("quotes", Row::new(), None).unwrap();
    }
    let parts = store.into_parts().unwrap();

    let next_day = Store::new(parts, generator_on(2024, 8, 16));
    let id = next_day.insert_row("quotes", Row::new(), None).unwrap();
    assert_eq!(id, "20240816_00001");
}

#[test]
fn test_unconfigured_table_inserts_are_unique() {
    let snapshot = Snapshot::new().with_table("widgets", Table::new(["id", "name"]));
    let store = Store::new(
        StoreParts {
            snapshot,
            formats: FormatRegistry::new(),
            baseline: FormatRegistry::new(),
        },
        IdGenerator::default(),
    );

    for _ in 0..50 {
        store.insert_row("widgets", Row::new(), None).unwrap();
    }

    let ids = store.snapshot().unwrap().table("widgets").unwrap().ids();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 50);
    assert!(ids.iter().all(|id| id.starts_with("widg_")));
}

#[test]
fn test_concurrent_inserts_are_unique() {
    let store = Arc::new(shop_store(generator_on(2024, 8, 15)));

    let handles: Vec<_> = ["m1", "m2", "m1", "m3"]
        .into_iter()
        .map(|manufacturer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..20 {
                    let item = row(&[("manufacturer_id", json!(manufacturer))]);
                    store.insert_row("stock", item, Some(manufacturer)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = store.snapshot().unwrap();
    let ids = snapshot.table("stock").unwrap().ids();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), 83);
    assert_eq!(unique.len(), 83);
    assert!(ids.contains(&"sk_m1_0042".to_string()));
    assert!(ids.contains(&"sk_m3_0020".to_string()));
}

#[test]
fn test_migration_cascades_and_becomes_baseline() {
    let store = shop_store(generator_on(2024, 8, 15))
        .with_declared_references([Reference::new("quote_items", "replaces_quote", "quotes")]);

    let mut formats = store.formats().unwrap();
    formats.set("quotes", FormatEntry::new("QT-", 4));
    store.save_formats(formats).unwrap();

    let plan = store.pending().unwrap();
    assert_eq!(plan.tables.len(), 1);
    assert_eq!(plan.tables[0].cascades.len(), 2);

    let report = store.migrate(Confirmation::irreversible(&plan)).unwrap();
    assert_eq!(report.rows_rekeyed(), 4);
    assert_eq!(report.references_rewritten(), 4);

    let snapshot = store.snapshot().unwrap();
    assert_eq!(
        snapshot.table("quotes").unwrap().ids(),
        vec!["QT-0001", "QT-0002", "QT-0003", "QT-0004"]
    );
    let items = snapshot.table("quote_items").unwrap();
    let quote_ids: Vec<_> = items
        .rows
        .iter()
        .filter_map(|r| r.get("quote_id").and_then(key_string))
        .collect();
    assert_eq!(quote_ids, vec!["QT-0001", "QT-0001", "QT-0004"]);
    assert_eq!(items.rows[1]["replaces_quote"], json!("QT-0002"));

    // Padding 4 is below the daily threshold, so new quotes continue the sequence.
    assert_eq!(store.next_id("quotes", None).unwrap(), "QT-0005");
    assert!(store.pending().unwrap().is_noop());
}

#[test]
fn test_failed_migration_changes_nothing() {
    let store = shop_store(generator_on(2024, 8, 15));
    store
        .insert_row("customers", row(&[("name", json!("Echo"))]), None)
        .unwrap();
    let mut snapshot = store.snapshot().unwrap();
    let customers = snapshot.get_mut("customers").unwrap();
    let duplicate = customers.rows[0].clone();
    customers.rows.push(duplicate);

    let mut formats = fixtures::shop_formats();
    formats.set("customers", FormatEntry::new("C", 3));
    let store = Store::new(
        StoreParts {
            snapshot: snapshot.clone(),
            formats,
            baseline: fixtures::shop_formats(),
        },
        generator_on(2024, 8, 15),
    );

    let plan = store.pending().unwrap();
    let err = store.migrate(Confirmation::irreversible(&plan)).unwrap_err();
    assert!(matches!(err, StoreError::Migration(_)));
    assert!(err.to_string().contains("customers"));
    assert_eq!(store.snapshot().unwrap(), snapshot);
    assert_eq!(store.baseline().unwrap(), fixtures::shop_formats());
}
