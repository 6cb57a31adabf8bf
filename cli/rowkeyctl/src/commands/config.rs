//! Config commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::output::{print_single, OutputFormat};

use super::CommandContext;

/// Inspect the CLI configuration.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Show the effective configuration.
    Show,

    /// Print where the config file is read from.
    Path,
}

#[derive(Debug, Serialize)]
struct ConfigView {
    data: String,
    formats: String,
    baseline: String,
    log_level: String,
    date_partitioned_tables: Vec<String>,
    references: Vec<String>,
}

impl ConfigCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ConfigSubcommand::Show => show(ctx),
            ConfigSubcommand::Path => path(ctx),
        }
    }
}

fn show(ctx: CommandContext) -> Result<()> {
    let view = ConfigView {
        data: ctx.workspace.data.display().to_string(),
        formats: ctx.workspace.formats.display().to_string(),
        baseline: ctx.workspace.baseline().display().to_string(),
        log_level: ctx.config.log_level.clone(),
        date_partitioned_tables: ctx
            .config
            .generator
            .date_partitioned_tables
            .iter()
            .cloned()
            .collect(),
        references: ctx
            .config
            .declared_references()?
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    match ctx.format {
        OutputFormat::Json => print_single(&view),
        OutputFormat::Table => {
            println!("data: {}", view.data);
            println!("formats: {}", view.formats);
            println!("baseline: {}", view.baseline);
            println!("log_level: {}", view.log_level);
            println!("date_partitioned_tables: {}", view.date_partitioned_tables.join(", "));
            if view.references.is_empty() {
                println!("references: -");
            } else {
                println!("references:");
                for reference in &view.references {
                    println!("  {reference}");
                }
            }
        }
    }

    Ok(())
}

fn path(ctx: CommandContext) -> Result<()> {
    let path = Config::path()?;
    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        })),
        OutputFormat::Table => println!("{}", path.display()),
    }
    Ok(())
}
