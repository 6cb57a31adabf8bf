//! The format registry keyed by table name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FormatEntry, FormatError};

/// One table's format in list-shaped documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRecord {
    pub table_name: String,

    #[serde(flatten)]
    pub entry: FormatEntry,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryDocument {
    Map(BTreeMap<String, FormatEntry>),
    List(Vec<FormatRecord>),
}

/// Format entries keyed by table name.
///
/// Lookups never fail: [`FormatRegistry::resolve`] returns the default entry
/// for tables that have not been configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormatRegistry {
    entries: BTreeMap<String, FormatEntry>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a registry from JSON.
    ///
    /// Accepts either `{"table": {...}}` or
    /// `[{"table_name": "table", ...}]`.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let document: RegistryDocument = serde_json::from_str(json)?;
        let entries = match document {
            RegistryDocument::Map(map) => map,
            RegistryDocument::List(records) => {
                let mut map = BTreeMap::new();
                for record in records {
                    if map.contains_key(&record.table_name) {
                        return Err(FormatError::DuplicateTable(record.table_name));
                    }
                    map.insert(record.table_name, record.entry);
                }
                map
            }
        };

        if entries.keys().any(|name| name.is_empty()) {
            return Err(FormatError::EmptyTableName);
        }

        debug!(tables = entries.len(), "Loaded format registry");
        Ok(Self { entries })
    }

    /// Serializes the registry as a pretty-printed JSON map.
    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the configured entry for a table, if any.
    pub fn get(&self, table: &str) -> Option<&FormatEntry> {
        self.entries.get(table)
    }

    /// Returns the entry for a table, or the default entry.
    pub fn resolve(&self, table: &str) -> FormatEntry {
        self.entries.get(table).cloned().unwrap_or_default()
    }

    /// Configures a table.
    pub fn set(&mut self, table: impl Into<String>, entry: FormatEntry) {
        self.entries.insert(table.into(), entry);
    }

    /// Resets a table to the default entry.
    ///
    /// The entry stays in the registry; tables are never removed while they
    /// exist in the data store.
    pub fn reset(&mut self, table: &str) {
        self.entries.insert(table.to_string(), FormatEntry::default());
    }

    /// Adds default entries for any of `tables` not yet configured.
    ///
    /// Returns the number of entries created.
    pub fn ensure_tables<I, S>(&mut self, tables: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut created = 0;
        for table in tables {
            let table = table.as_ref();
            if !self.entries.contains_key(table) {
                self.entries.insert(table.to_string(), FormatEntry::default());
                created += 1;
            }
        }
        created
    }

    /// Iterates entries in table-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormatEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Table names with an entry, in order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FormatEntry)> for FormatRegistry {
    fn from_iter<T: IntoIterator<Item = (String, FormatEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
