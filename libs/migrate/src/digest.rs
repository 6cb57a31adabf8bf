//! Change detection between format registries.

use std::collections::BTreeSet;

use rowkey_formats::{FormatEntry, FormatRegistry};
use sha2::{Digest, Sha256};

use crate::MigrationError;

/// A content hash of one format entry.
///
/// Two entries have the same digest exactly when they serialize to the same
/// canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatDigest(String);

impl FormatDigest {
    /// Hashes a format entry.
    pub fn of(entry: &FormatEntry) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(entry)?;
        let canonical = canonical_json(&value);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let result = hasher.finalize();
        Ok(Self(format!("sha256:{}", hex::encode(&result[..16]))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormatDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tables whose entry differs between `old` and `new`, in name order.
///
/// A table missing from one side compares as the default entry, so adding
/// default entries never triggers a migration. Whether a changed table can
/// actually be migrated is decided by [`crate::plan`].
pub fn changed_tables(
    old: &FormatRegistry,
    new: &FormatRegistry,
) -> Result<Vec<String>, MigrationError> {
    let names: BTreeSet<&str> = old.tables().chain(new.tables()).collect();
    let implicit = FormatEntry::default();

    let mut changed = Vec::new();
    for name in names {
        let digest = |registry: &FormatRegistry| {
            FormatDigest::of(registry.get(name).unwrap_or(&implicit)).map_err(|e| {
                MigrationError::UnhashableFormat {
                    table: name.to_string(),
                    reason: e.to_string(),
                }
            })
        };
        if digest(old)? != digest(new)? {
            changed.push(name.to_string());
        }
    }
    Ok(changed)
}

/// Sorted keys, no whitespace.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let inner: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}:{}", quoted(k), canonical_json(v)))
                .collect();
            format!("{{{}}}", inner.join(","))
        }
        serde_json::Value::Array(arr) => {
            let inner: Vec<String> = arr.iter().map(canonical_json).collect();
            format!("[{}]", inner.join(","))
        }
        serde_json::Value::String(s) => quoted(s),
        other => other.to_string(),
    }
}

fn quoted(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
