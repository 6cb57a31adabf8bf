//! Snapshot and format files on disk.
//!
//! Three JSON files make up a workspace: the snapshot, the live format
//! registry, and the baseline registry the snapshot is currently keyed
//! under (stored next to the formats as `<stem>.baseline.json`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rowkey_formats::FormatRegistry;
use rowkey_snapshot::Snapshot;
use rowkey_store::StoreParts;
use tokio::fs;
use tracing::debug;

use crate::error::CliError;

/// Locations of the files a command works on.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub data: PathBuf,
    pub formats: PathBuf,
}

impl Workspace {
    pub fn new(data: impl Into<PathBuf>, formats: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            formats: formats.into(),
        }
    }

    /// Where the baseline registry lives.
    pub fn baseline(&self) -> PathBuf {
        let stem = self
            .formats
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "formats".to_string());
        self.formats.with_file_name(format!("{stem}.baseline.json"))
    }

    /// Reads the snapshot. The file must exist.
    pub async fn load_snapshot(&self) -> Result<Snapshot> {
        let Some(contents) = read_optional(&self.data).await? else {
            return Err(CliError::FileNotFound(self.data.clone()).into());
        };
        Snapshot::from_json(&contents)
            .with_context(|| format!("Failed to parse snapshot from {:?}", self.data))
    }

    /// Reads the live formats, empty if the file does not exist yet.
    pub async fn load_formats(&self) -> Result<FormatRegistry> {
        load_registry(&self.formats).await.map(Option::unwrap_or_default)
    }

    /// Reads the baseline, or takes `formats` as the baseline if none was saved.
    pub async fn load_baseline(&self, formats: &FormatRegistry) -> Result<FormatRegistry> {
        let baseline = load_registry(&self.baseline()).await?;
        Ok(baseline.unwrap_or_else(|| formats.clone()))
    }

    /// Reads everything a store needs.
    pub async fn load_parts(&self) -> Result<StoreParts> {
        let snapshot = self.load_snapshot().await?;
        let formats = self.load_formats().await?;
        let baseline = self.load_baseline(&formats).await?;
        Ok(StoreParts {
            snapshot,
            formats,
            baseline,
        })
    }

    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        write_atomic(&self.data, &snapshot.to_json_pretty()?).await
    }

    pub async fn save_formats(&self, formats: &FormatRegistry) -> Result<()> {
        write_atomic(&self.formats, &formats.to_json_pretty()?).await
    }

    pub async fn save_baseline(&self, baseline: &FormatRegistry) -> Result<()> {
        write_atomic(&self.baseline(), &baseline.to_json_pretty()?).await
    }

    /// Writes the baseline only if none exists yet.
    ///
    /// The first format save pins what the data was keyed under before it.
    pub async fn pin_baseline(&self, current: &FormatRegistry) -> Result<()> {
        if fs::try_exists(self.baseline()).await? {
            return Ok(());
        }
        self.save_baseline(current).await
    }
}

async fn load_registry(path: &Path) -> Result<Option<FormatRegistry>> {
    let Some(contents) = read_optional(path).await? else {
        return Ok(None);
    };
    let registry = FormatRegistry::from_json(&contents)
        .with_context(|| format!("Failed to parse formats from {:?}", path))?;
    Ok(Some(registry))
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
    }
}

/// Writes through a temporary file so readers never see a partial document.
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)
        .await
        .with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {:?}", path))?;

    debug!(path = ?path, bytes = contents.len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkey_formats::FormatEntry;
    use rowkey_testing::fixtures;

    fn workspace(dir: &tempfile::TempDir) -> Workspace {
        Workspace::new(dir.path().join("data.json"), dir.path().join("formats.json"))
    }

    #[test]
    fn test_baseline_path() {
        let ws = Workspace::new("shop/data.json", "shop/formats.json");
        assert_eq!(ws.baseline(), PathBuf::from("shop/formats.baseline.json"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = workspace(&dir).load_snapshot().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_formats_and_baseline_default() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        ws.save_snapshot(&fixtures::shop_snapshot()).await.unwrap();

        let parts = ws.load_parts().await.unwrap();
        assert!(parts.formats.is_empty());
        assert_eq!(parts.baseline, parts.formats);
        assert_eq!(parts.snapshot, fixtures::shop_snapshot());
    }

    #[tokio::test]
    async fn test_pin_baseline_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir);
        let original = fixtures::shop_formats();
        ws.pin_baseline(&original).await.unwrap();

        let mut changed = original.clone();
        changed.set("customers", FormatEntry::new("C", 3));
        ws.pin_baseline(&changed).await.unwrap();
        ws.save_formats(&changed).await.unwrap();

        let formats = ws.load_formats().await.unwrap();
        assert_eq!(formats, changed);
        assert_eq!(ws.load_baseline(&formats).await.unwrap(), original);
        assert!(!dir.path().join("formats.json.tmp").exists());
    }
}
