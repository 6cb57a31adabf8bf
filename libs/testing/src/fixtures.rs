//! A small shop data set: customers, quotes, quote items, stock and
//! manufacturers, with foreign keys following the `{singular}_id` convention.
//!
//! `quote_items.replaces_quote` references quotes without following the
//! convention.

use rowkey_formats::{FormatEntry, FormatRegistry};
use rowkey_snapshot::{Row, Snapshot, Table};
use serde_json::{json, Value};

/// Builds a row from `(column, value)` pairs.
pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

pub fn customers() -> Table {
    Table::new(["id", "name"]).with_rows([
        row(&[("id", json!("cust_000001")), ("name", json!("Acme Glazing"))]),
        row(&[("id", json!("cust_000042")), ("name", json!("Baker & Sons"))]),
        row(&[("id", json!("cust_000043")), ("name", json!("Cole Interiors"))]),
    ])
}

pub fn quotes() -> Table {
    Table::new(["id", "customer_id", "total"]).with_rows([
        row(&[
            ("id", json!("20240814_00001")),
            ("customer_id", json!("cust_000042")),
            ("total", json!(1200)),
        ]),
        row(&[
            ("id", json!("20240814_00002")),
            ("customer_id", json!("cust_000001")),
            ("total", json!(80.5)),
        ]),
        row(&[
            ("id", json!("20240815_00001")),
            ("customer_id", json!("cust_999999")),
            ("total", json!(0)),
        ]),
        row(&[
            ("id", json!("20240815_00002")),
            ("customer_id", json!("cust_000042")),
            ("total", json!(455)),
        ]),
    ])
}

pub fn quote_items() -> Table {
    Table::new(["id", "quote_id", "stock_id", "replaces_quote", "qty"]).with_rows([
        row(&[
            ("id", json!("qi_0001")),
            ("quote_id", json!("20240814_00001")),
            ("stock_id", json!("sk_m1_2")),
            ("replaces_quote", Value::Null),
            ("qty", json!(4)),
        ]),
        row(&[
            ("id", json!("qi_0002")),
            ("quote_id", json!("20240814_00001")),
            ("stock_id", json!("sk_m2_1")),
            ("replaces_quote", json!("20240814_00002")),
            ("qty", json!(1)),
        ]),
        row(&[
            ("id", json!("qi_0003")),
            ("quote_id", json!("20240815_00002")),
            ("stock_id", json!("sk_m1_1")),
            ("replaces_quote", Value::Null),
            ("qty", json!(12)),
        ]),
    ])
}

pub fn stock() -> Table {
    Table::new(["id", "manufacturer_id", "name"]).with_rows([
        row(&[
            ("id", json!("sk_m1_1")),
            ("manufacturer_id", json!("m1")),
            ("name", json!("Float glass 4mm")),
        ]),
        row(&[
            ("id", json!("sk_m1_2")),
            ("manufacturer_id", json!("m1")),
            ("name", json!("Float glass 6mm")),
        ]),
        row(&[
            ("id", json!("sk_m2_1")),
            ("manufacturer_id", json!("m2")),
            ("name", json!("Aluminium frame")),
        ]),
    ])
}

pub fn manufacturers() -> Table {
    Table::new(["id", "name"]).with_rows([
        row(&[("id", json!("m1")), ("name", json!("Northglass"))]),
        row(&[("id", json!("m2")), ("name", json!("Alframe"))]),
    ])
}

/// Every fixture table plus an empty `notes` table.
pub fn shop_snapshot() -> Snapshot {
    Snapshot::new()
        .with_table("customers", customers())
        .with_table("quotes", quotes())
        .with_table("quote_items", quote_items())
        .with_table("stock", stock())
        .with_table("manufacturers", manufacturers())
        .with_table("notes", Table::new(["id", "body"]))
}

/// Formats matching the ids in [`shop_snapshot`].
pub fn shop_formats() -> FormatRegistry {
    let mut formats = FormatRegistry::new();
    formats.set("customers", FormatEntry::new("cust_", 6));
    formats.set("quotes", FormatEntry::new("", 14));
    formats.set("quote_items", FormatEntry::new("qi_", 4));
    formats.set("stock", FormatEntry::new("sk_", 10).manufacturer_dependent());
    formats.set("manufacturers", FormatEntry::new("manu_", 4));
    formats.set("notes", FormatEntry::default());
    formats
}
