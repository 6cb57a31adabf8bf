//! Next-id command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::error::CliError;
use crate::output::{print_single, OutputFormat};

use super::CommandContext;

/// Show the id the next inserted row would receive.
#[derive(Debug, Args)]
pub struct NextIdCommand {
    /// Table name.
    #[arg(long, short = 't')]
    table: String,

    /// Manufacturer id for manufacturer-dependent tables.
    #[arg(long, short = 'm')]
    manufacturer: Option<String>,
}

#[derive(Debug, Serialize)]
struct NextIdView {
    table: String,
    id: String,
}

impl NextIdCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let store = ctx.open_store().await?;
        let id = store
            .next_id(&self.table, self.manufacturer.as_deref())
            .map_err(CliError::from)?;

        match ctx.format {
            OutputFormat::Json => print_single(&NextIdView {
                table: self.table,
                id,
            }),
            OutputFormat::Table => println!("{id}"),
        }

        Ok(())
    }
}
