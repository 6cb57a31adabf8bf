//! Table and column naming conventions.

/// Strips a single trailing `s` from a table name.
///
/// This is a structural rule, not English pluralization: `addresses`
/// becomes `addresse` and `stock` stays `stock`.
pub fn singular(table: &str) -> &str {
    table.strip_suffix('s').unwrap_or(table)
}

/// Returns the column name other tables use to reference `table`.
pub fn foreign_key_column(table: &str) -> String {
    format!("{}_id", singular(table))
}
