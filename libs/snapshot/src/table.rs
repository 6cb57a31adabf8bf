//! Tables, rows, and the snapshot container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SnapshotError;

/// A row: column name to scalar value.
pub type Row = BTreeMap<String, Value>;

/// Returns the string-comparable identifier form of a scalar.
///
/// Strings are used verbatim and numbers by their decimal text. Booleans,
/// nulls, arrays and objects are never identifiers.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One table of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Ordered column names. The first column is the primary key.
    #[serde(default)]
    pub schema: Vec<String>,

    /// Rows in store order.
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given columns.
    #[must_use]
    pub fn new<I, S>(schema: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Returns the table with `rows` appended.
    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// The primary-key column, if the table has a schema.
    pub fn primary_key(&self) -> Option<&str> {
        self.schema.first().map(String::as_str)
    }

    pub fn has_schema(&self) -> bool {
        !self.schema.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.schema.iter().any(|c| c == column)
    }

    /// Primary-key values of every row that has one.
    pub fn ids(&self) -> Vec<String> {
        let Some(pk) = self.primary_key() else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(pk).and_then(key_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every table of a data store, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: BTreeMap<String, Table>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a snapshot from JSON of the form `{"table": {"schema": [...], "rows": [...]}}`.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    /// Builder form of [`Snapshot::insert`].
    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Looks up a table, failing if it is absent.
    pub fn table(&self, name: &str) -> Result<&Table, SnapshotError> {
        self.get(name)
            .ok_or_else(|| SnapshotError::TableNotFound(name.to_string()))
    }

    /// Iterates tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
