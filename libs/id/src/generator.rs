//! The identifier generator.

use std::sync::Arc;

use rowkey_formats::FormatEntry;
use rowkey_snapshot::Table;
use tracing::debug;

use crate::sequence::{next_in_scope, zero_pad};
use crate::{Clock, GeneratorConfig, Scheme, SystemClock};

/// Minimum sequence width for date-partitioned ids.
const DATE_SEQUENCE_MIN_WIDTH: usize = 5;

/// Number of table-name characters kept by the timestamp fallback.
const FALLBACK_TABLE_CHARS: usize = 4;

/// A generated identifier and how it was derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedId {
    /// The identifier.
    pub id: String,
    /// Scheme that produced it.
    pub scheme: Scheme,
    /// Literal prefix shared by every id in the same sequence.
    pub scope: String,
    /// Sequence value; unix milliseconds for the timestamp fallback.
    pub sequence: Option<u64>,
    /// Zero-padding width of the sequence.
    pub width: usize,
}

impl GeneratedId {
    /// Re-renders this id with a different sequence value in the same scope.
    #[must_use]
    pub fn with_sequence(&self, sequence: u64) -> Self {
        Self {
            id: format!("{}{}", self.scope, zero_pad(sequence, self.width)),
            sequence: Some(sequence),
            ..self.clone()
        }
    }
}

/// Computes the next identifier for a table.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    config: GeneratorConfig,
    clock: Arc<dyn Clock>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl IdGenerator {
    /// Creates a generator reading the system clock.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a generator with an explicit clock.
    #[must_use]
    pub fn with_clock(config: GeneratorConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Returns the next id for `table` given its current rows.
    ///
    /// `format` is `None` when the table has never been configured.
    pub fn generate(
        &self,
        table_name: &str,
        table: &Table,
        format: Option<&FormatEntry>,
        manufacturer_id: Option<&str>,
    ) -> String {
        let ids = table.ids();
        self.generate_from_ids(
            table_name,
            ids.iter().map(String::as_str),
            format,
            manufacturer_id,
        )
        .id
    }

    /// Like [`IdGenerator::generate`], over bare primary-key values.
    pub fn generate_from_ids<'a, I>(
        &self,
        table_name: &str,
        existing: I,
        format: Option<&FormatEntry>,
        manufacturer_id: Option<&str>,
    ) -> GeneratedId
    where
        I: IntoIterator<Item = &'a str>,
    {
        let scheme = Scheme::select(&self.config, table_name, format, manufacturer_id);

        let generated = match (scheme, format) {
            (Scheme::ManufacturerScoped, Some(format)) => {
                let manufacturer = manufacturer_id.unwrap_or_default();
                let scope = format!("{}{}_", format.prefix, manufacturer);
                let width = width_after(format.padding, &scope).max(1);
                sequenced(scheme, scope, width, existing)
            }
            (Scheme::DatePartitioned, Some(format)) => {
                let day = self.clock.now().format("%Y%m%d");
                let scope = format!("{}{}_", format.prefix, day);
                let width = width_after(format.padding, &scope).max(DATE_SEQUENCE_MIN_WIDTH);
                sequenced(scheme, scope, width, existing)
            }
            (Scheme::Sequential, Some(format)) => {
                // Ids without the prefix are parsed whole.
                let prefix = format.prefix.as_str();
                let next = existing
                    .into_iter()
                    .map(|id| id.strip_prefix(prefix).unwrap_or(id));
                let seq = next_in_scope(next, "");
                GeneratedId {
                    id: format!("{}{}", prefix, zero_pad(seq, format.padding as usize)),
                    scheme,
                    scope: prefix.to_string(),
                    sequence: Some(seq),
                    width: format.padding as usize,
                }
            }
            _ => self.fallback(table_name),
        };

        debug!(
            table = table_name,
            scheme = %generated.scheme,
            id = %generated.id,
            "Generated id"
        );
        generated
    }

    fn fallback(&self, table_name: &str) -> GeneratedId {
        let short: String = table_name.chars().take(FALLBACK_TABLE_CHARS).collect();
        let scope = format!("{short}_");
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or_default();
        GeneratedId {
            id: format!("{scope}{millis}"),
            scheme: Scheme::Fallback,
            scope,
            sequence: Some(millis),
            width: 0,
        }
    }
}

/// Padding left for the sequence once `scope` is accounted for.
fn width_after(padding: u32, scope: &str) -> usize {
    (padding as usize).saturating_sub(scope.chars().count())
}

fn sequenced<'a, I>(scheme: Scheme, scope: String, width: usize, existing: I) -> GeneratedId
where
    I: IntoIterator<Item = &'a str>,
{
    let seq = next_in_scope(existing, &scope);
    GeneratedId {
        id: format!("{}{}", scope, zero_pad(seq, width)),
        scheme,
        scope,
        sequence: Some(seq),
        width,
    }
}
