//! Insert command.

use anyhow::Result;
use clap::Args;
use rowkey_snapshot::Row;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::CliError;
use crate::output::{print_single, print_success, OutputFormat};

use super::CommandContext;

/// Insert a row and assign it the next primary key.
#[derive(Debug, Args)]
pub struct InsertCommand {
    /// Table name.
    #[arg(long, short = 't')]
    table: String,

    /// Row as a JSON object. Any primary-key value is replaced.
    #[arg(long, default_value = "{}")]
    row: String,

    /// Manufacturer id for manufacturer-dependent tables.
    #[arg(long, short = 'm')]
    manufacturer: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertedView {
    table: String,
    id: String,
}

impl InsertCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let row = parse_row(&self.row)?;

        let store = ctx.open_store().await?;
        let id = store
            .insert_row(&self.table, row, self.manufacturer.as_deref())
            .map_err(CliError::from)?;

        let parts = store.into_parts()?;
        ctx.workspace.save_snapshot(&parts.snapshot).await?;
        info!(table = %self.table, %id, "Saved snapshot");

        match ctx.format {
            OutputFormat::Json => print_single(&InsertedView {
                table: self.table,
                id,
            }),
            OutputFormat::Table => print_success(&format!("Inserted {} into {}", id, self.table)),
        }

        Ok(())
    }
}

fn parse_row(raw: &str) -> Result<Row, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(CliError::InvalidRow(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(CliError::InvalidRow(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_row() {
        let row = parse_row(r#"{"name": "Acme", "qty": 3}"#).unwrap();
        assert_eq!(row["name"], json!("Acme"));
        assert_eq!(row["qty"], json!(3));
        assert!(parse_row("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_row_rejects_non_objects() {
        assert!(matches!(parse_row("[1, 2]"), Err(CliError::InvalidRow(_))));
        assert!(matches!(parse_row("{name"), Err(CliError::InvalidRow(_))));
    }
}
