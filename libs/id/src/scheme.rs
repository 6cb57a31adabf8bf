//! Scheme selection.

use std::collections::BTreeSet;
use std::fmt;

use rowkey_formats::FormatEntry;
use serde::{Deserialize, Serialize};

/// Tables whose ids are partitioned by calendar date unless configured otherwise.
pub const DEFAULT_DATE_PARTITIONED_TABLES: [&str; 2] = ["quotes", "invoices"];

/// Padding above this value opts a date-significant table into daily ids.
const DATE_PADDING_THRESHOLD: u32 = 8;

/// Generator settings that are not per-table formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Tables eligible for the date-partitioned scheme.
    #[serde(default = "default_date_partitioned_tables")]
    pub date_partitioned_tables: BTreeSet<String>,
}

fn default_date_partitioned_tables() -> BTreeSet<String> {
    DEFAULT_DATE_PARTITIONED_TABLES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            date_partitioned_tables: default_date_partitioned_tables(),
        }
    }
}

impl GeneratorConfig {
    pub fn is_date_significant(&self, table: &str) -> bool {
        self.date_partitioned_tables.contains(table)
    }
}

/// The numbering algorithm applied to one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// `{prefix}{manufacturer}_{seq}`, sequenced per manufacturer.
    ManufacturerScoped,
    /// `{prefix}{YYYYMMDD}_{seq}`, sequenced per day.
    DatePartitioned,
    /// `{prefix}{seq}`, sequenced across the whole table.
    Sequential,
    /// `{table[..4]}_{unix_millis}` for tables with no format.
    Fallback,
}

impl Scheme {
    /// Picks the scheme for a table.
    ///
    /// An empty manufacturer id counts as not supplied.
    pub fn select(
        config: &GeneratorConfig,
        table: &str,
        format: Option<&FormatEntry>,
        manufacturer_id: Option<&str>,
    ) -> Self {
        let Some(format) = format else {
            return Self::Fallback;
        };

        let has_manufacturer = manufacturer_id.is_some_and(|m| !m.is_empty());
        if format.is_manufacturer_dependent && has_manufacturer {
            Self::ManufacturerScoped
        } else if config.is_date_significant(table) && format.padding > DATE_PADDING_THRESHOLD {
            Self::DatePartitioned
        } else {
            Self::Sequential
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManufacturerScoped => "manufacturer_scoped",
            Self::DatePartitioned => "date_partitioned",
            Self::Sequential => "sequential",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
