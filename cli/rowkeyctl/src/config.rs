//! Configuration.
//!
//! Handles:
//! - Default snapshot and format file locations
//! - Date-partitioned tables
//! - Declared references the naming convention cannot find
//! - Log level

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rowkey_id::GeneratorConfig;
use rowkey_snapshot::Reference;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Get the config directory path.
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "rowkey", "rowkey")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file used when `--data` is not given.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Format registry file used when `--formats` is not given.
    #[serde(default = "default_formats_path")]
    pub formats_path: PathBuf,

    /// Log filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(flatten)]
    pub generator: GeneratorConfig,

    /// References in `table.column -> target` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("rowkey-data.json")
}

fn default_formats_path() -> PathBuf {
    PathBuf::from("rowkey-formats.json")
}

fn default_log_level() -> String {
    std::env::var("ROWKEY_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            formats_path: default_formats_path(),
            log_level: default_log_level(),
            generator: GeneratorConfig::default(),
            references: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::from_json(&contents).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.declared_references()?;
        Ok(config)
    }

    /// Parses the configured references.
    pub fn declared_references(&self) -> Result<Vec<Reference>> {
        self.references
            .iter()
            .map(|raw| {
                raw.parse::<Reference>()
                    .map_err(|e| anyhow::anyhow!("Invalid reference in config: {e}"))
            })
            .collect()
    }

    /// Path of the config file, whether or not it exists.
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data_path, PathBuf::from("rowkey-data.json"));
        assert!(config.generator.is_date_significant("quotes"));
        assert!(config.declared_references().unwrap().is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let config = Config::from_json(
            r#"{
                "data_path": "/srv/shop/data.json",
                "date_partitioned_tables": ["orders", "quotes"],
                "references": ["quote_items.replaces_quote -> quotes"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/shop/data.json"));
        assert_eq!(config.formats_path, PathBuf::from("rowkey-formats.json"));
        assert!(config.generator.is_date_significant("orders"));
        assert!(!config.generator.is_date_significant("invoices"));
        assert_eq!(
            config.declared_references().unwrap(),
            vec![Reference::new("quote_items", "replaces_quote", "quotes")]
        );
    }

    #[test]
    fn test_config_rejects_bad_reference() {
        assert!(Config::from_json(r#"{"references": ["quotes"]}"#).is_err());
    }
}
