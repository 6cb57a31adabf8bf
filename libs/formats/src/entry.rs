//! Format entry definition and boundary normalization.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Numbering configuration for one logical table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatEntry {
    /// Prepended verbatim to every generated identifier. May be empty.
    #[serde(default)]
    pub prefix: String,

    /// Total width of the numeric portion.
    ///
    /// For date-significant tables a value above 8 switches the table to
    /// date-partitioned identifiers.
    #[serde(default)]
    pub padding: u32,

    /// Whether identifiers are sequenced per manufacturer.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_manufacturer_dependent: bool,
}

impl FormatEntry {
    /// Creates an entry for a simple prefixed sequence.
    #[must_use]
    pub fn new(prefix: impl Into<String>, padding: u32) -> Self {
        Self {
            prefix: prefix.into(),
            padding,
            is_manufacturer_dependent: false,
        }
    }

    /// Returns the same entry with manufacturer scoping switched on.
    #[must_use]
    pub fn manufacturer_dependent(mut self) -> Self {
        self.is_manufacturer_dependent = true;
        self
    }

    /// Returns true if this entry equals the implicit default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Accepts `true`/`false`, `1`/`0`, `"1"`/`"0"`, `"true"`/`"false"` and
/// `null` for the manufacturer flag.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, 0/1, or the string \"0\"/\"1\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        match v.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}
