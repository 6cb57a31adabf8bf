//! CLI commands.

mod config;
mod formats;
mod insert;
mod migrate;
mod next_id;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rowkey_id::{IdGenerator, SystemClock};
use rowkey_store::{Store, StoreParts};

use crate::config::Config;
use crate::files::Workspace;
use crate::output::OutputFormat;

/// rowkey - generate primary keys and re-key table snapshots.
#[derive(Debug, Parser)]
#[command(name = "rowkey")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// Snapshot file.
    #[arg(long, global = true, env = "ROWKEY_DATA")]
    data: Option<PathBuf>,

    /// Format registry file.
    #[arg(long, global = true, env = "ROWKEY_FORMATS")]
    formats: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the next id for a table without inserting a row.
    NextId(next_id::NextIdCommand),

    /// Insert a row under a freshly generated id.
    Insert(insert::InsertCommand),

    /// View and edit per-table formats.
    Formats(formats::FormatsCommand),

    /// Re-key tables whose format changed.
    Migrate(migrate::MigrateCommand),

    /// Show the CLI configuration.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self, config: Config) -> Result<()> {
        let workspace = Workspace::new(
            self.data.unwrap_or_else(|| config.data_path.clone()),
            self.formats.unwrap_or_else(|| config.formats_path.clone()),
        );

        let ctx = CommandContext {
            config,
            workspace,
            format: OutputFormat::parse(&self.format),
        };

        match self.command {
            Commands::NextId(cmd) => cmd.run(ctx).await,
            Commands::Insert(cmd) => cmd.run(ctx).await,
            Commands::Formats(cmd) => cmd.run(ctx).await,
            Commands::Migrate(cmd) => cmd.run(ctx).await,
            Commands::Config(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("rowkey {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub workspace: Workspace,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build a store over loaded files.
    pub fn store(&self, parts: StoreParts) -> Result<Store> {
        let generator =
            IdGenerator::with_clock(self.config.generator.clone(), Arc::new(SystemClock));
        Ok(Store::new(parts, generator).with_declared_references(self.config.declared_references()?))
    }

    /// Load the workspace files into a store.
    pub async fn open_store(&self) -> Result<Store> {
        let parts = self.workspace.load_parts().await?;
        self.store(parts)
    }
}
