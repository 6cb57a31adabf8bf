//! Format commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use rowkey_formats::{FormatEntry, FormatRegistry};
use rowkey_migrate::changed_tables;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::error::CliError;
use crate::output::{print_info, print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

/// View and edit per-table formats.
///
/// Edits only change how new ids look. Existing keys keep their shape until
/// `rowkey migrate` runs.
#[derive(Debug, Args)]
pub struct FormatsCommand {
    #[command(subcommand)]
    command: FormatsSubcommand,
}

#[derive(Debug, Subcommand)]
enum FormatsSubcommand {
    /// List configured formats.
    List,

    /// Set or update the format of a table.
    Set(SetFormatArgs),

    /// Reset a table to the default format.
    Reset(ResetFormatArgs),

    /// Add default formats for every table in the snapshot.
    Init,

    /// List tables whose format differs from the one the data is keyed under.
    Pending,
}

#[derive(Debug, Args)]
struct SetFormatArgs {
    /// Table name.
    table: String,

    /// Prefix prepended to every id.
    #[arg(long)]
    prefix: Option<String>,

    /// Width of the numeric part.
    #[arg(long)]
    padding: Option<u32>,

    /// Sequence ids per manufacturer.
    #[arg(long)]
    manufacturer_dependent: Option<bool>,
}

#[derive(Debug, Args)]
struct ResetFormatArgs {
    /// Table name.
    table: String,
}

#[derive(Debug, Serialize, Tabled)]
struct FormatRow {
    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Prefix")]
    prefix: String,

    #[tabled(rename = "Padding")]
    padding: u32,

    #[tabled(rename = "Per Manufacturer")]
    manufacturer_dependent: bool,

    #[tabled(rename = "Pending")]
    pending: bool,
}

impl FormatsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            FormatsSubcommand::List => list(ctx).await,
            FormatsSubcommand::Set(args) => set(ctx, args).await,
            FormatsSubcommand::Reset(args) => reset(ctx, args).await,
            FormatsSubcommand::Init => init(ctx).await,
            FormatsSubcommand::Pending => pending(ctx).await,
        }
    }
}

async fn list(ctx: CommandContext) -> Result<()> {
    let formats = ctx.workspace.load_formats().await?;
    let baseline = ctx.workspace.load_baseline(&formats).await?;
    let changed = changed_tables(&baseline, &formats)?;

    let rows: Vec<FormatRow> = formats
        .iter()
        .map(|(table, entry)| FormatRow {
            table: table.to_string(),
            prefix: entry.prefix.clone(),
            padding: entry.padding,
            manufacturer_dependent: entry.is_manufacturer_dependent,
            pending: changed.iter().any(|name| name == table),
        })
        .collect();

    print_output(&rows, ctx.format);
    Ok(())
}

async fn set(ctx: CommandContext, args: SetFormatArgs) -> Result<()> {
    let before = ctx.workspace.load_formats().await?;
    let mut entry = before.resolve(&args.table);
    if let Some(prefix) = args.prefix {
        entry.prefix = prefix;
    }
    if let Some(padding) = args.padding {
        entry.padding = padding;
    }
    if let Some(flag) = args.manufacturer_dependent {
        entry.is_manufacturer_dependent = flag;
    }

    let mut formats = before.clone();
    formats.set(args.table.clone(), entry.clone());
    save(&ctx, &before, &formats).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({
            "table": args.table,
            "format": entry,
        })),
        OutputFormat::Table => print_success(&format!("Updated format for {}", args.table)),
    }
    Ok(())
}

async fn reset(ctx: CommandContext, args: ResetFormatArgs) -> Result<()> {
    let before = ctx.workspace.load_formats().await?;
    let mut formats = before.clone();
    formats.reset(&args.table);
    save(&ctx, &before, &formats).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({
            "table": args.table,
            "format": FormatEntry::default(),
        })),
        OutputFormat::Table => print_success(&format!("Reset format for {}", args.table)),
    }
    Ok(())
}

async fn init(ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let before = store.formats().map_err(CliError::from)?;
    let created = store.ensure_formats().map_err(CliError::from)?;
    if created > 0 {
        let formats = store.formats().map_err(CliError::from)?;
        save(&ctx, &before, &formats).await?;
    }

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({ "created": created })),
        OutputFormat::Table if created == 0 => print_info("Every table already has a format"),
        OutputFormat::Table => print_success(&format!("Added {created} default format(s)")),
    }
    Ok(())
}

async fn pending(ctx: CommandContext) -> Result<()> {
    let formats = ctx.workspace.load_formats().await?;
    let baseline = ctx.workspace.load_baseline(&formats).await?;
    let changed = changed_tables(&baseline, &formats)?;

    match ctx.format {
        OutputFormat::Json => print_single(&changed),
        OutputFormat::Table if changed.is_empty() => print_info("No format changes pending"),
        OutputFormat::Table => {
            for table in &changed {
                println!("{table}");
            }
            print_info("Run `rowkey migrate --dry-run` to see what re-keying would do");
        }
    }
    Ok(())
}

/// Pins the baseline before the first edit, then writes the new formats.
async fn save(ctx: &CommandContext, before: &FormatRegistry, formats: &FormatRegistry) -> Result<()> {
    let baseline = ctx.workspace.load_baseline(before).await?;
    ctx.workspace.pin_baseline(&baseline).await?;
    ctx.workspace.save_formats(formats).await?;
    info!(path = ?ctx.workspace.formats, tables = formats.len(), "Saved formats");
    Ok(())
}
