//! Migrate command.

use anyhow::Result;
use clap::Args;
use rowkey_migrate::{MigrationPlan, MigrationReport};
use rowkey_store::Confirmation;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::error::CliError;
use crate::output::{
    print_info, print_output, print_single, print_success, print_warning, OutputFormat,
};

use super::CommandContext;

/// Re-key every table whose format changed, rewriting references to it.
///
/// This cannot be undone. Without `--yes` the plan is printed and nothing
/// is written.
#[derive(Debug, Args)]
pub struct MigrateCommand {
    /// Print the plan and exit.
    #[arg(long)]
    dry_run: bool,

    /// Confirm the irreversible re-key.
    #[arg(long, short = 'y')]
    yes: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct PlanRow {
    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Key")]
    primary_key: String,

    #[tabled(rename = "Rows")]
    rows: usize,

    #[tabled(rename = "New Format")]
    format: String,

    #[tabled(rename = "References")]
    references: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ReportRow {
    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Rows")]
    rows: usize,

    #[tabled(rename = "Without Key")]
    unmapped_rows: usize,

    #[tabled(rename = "References Rewritten")]
    references_rewritten: usize,
}

impl MigrateCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let store = ctx.open_store().await?;
        let plan = store.pending().map_err(CliError::from)?;

        if plan.is_noop() {
            match ctx.format {
                OutputFormat::Json => print_single(&plan),
                OutputFormat::Table => {
                    print_skipped(&plan);
                    print_info("Nothing to migrate");
                }
            }
            return Ok(());
        }

        if self.dry_run || !self.yes {
            show_plan(&plan, ctx.format);
            if self.dry_run {
                return Ok(());
            }
            return Err(CliError::NotConfirmed {
                tables: plan.tables.len(),
            }
            .into());
        }

        let report = store
            .migrate(Confirmation::irreversible(&plan))
            .map_err(CliError::from)?;
        let parts = store.into_parts().map_err(CliError::from)?;

        // Snapshot first: a stale baseline only re-offers the migration.
        ctx.workspace.save_snapshot(&parts.snapshot).await?;
        ctx.workspace.save_baseline(&parts.baseline).await?;
        info!(
            tables = report.tables.len(),
            rows = report.rows_rekeyed(),
            "Saved migrated snapshot"
        );

        show_report(&report, ctx.format);
        Ok(())
    }
}

fn show_plan(plan: &MigrationPlan, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_single(plan);
        return;
    }

    let rows: Vec<PlanRow> = plan
        .tables
        .iter()
        .map(|t| PlanRow {
            table: t.table.clone(),
            primary_key: t.primary_key.clone(),
            rows: t.rows,
            format: format!(
                "{:?} / {}{}",
                t.format.prefix,
                t.format.padding,
                if t.format.is_manufacturer_dependent {
                    " / per manufacturer"
                } else {
                    ""
                }
            ),
            references: t
                .cascades
                .iter()
                .map(|r| format!("{}.{}", r.table, r.column))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    print_output(&rows, format);
    print_skipped(plan);
    print_info(&format!(
        "{} row(s) in {} table(s) would receive new keys",
        plan.total_rows(),
        plan.tables.len()
    ));
}

fn show_report(report: &MigrationReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_single(report);
        return;
    }

    let rows: Vec<ReportRow> = report
        .tables
        .iter()
        .map(|t| ReportRow {
            table: t.table.clone(),
            rows: t.rows,
            unmapped_rows: t.unmapped_rows,
            references_rewritten: t.rewritten_references(),
        })
        .collect();
    print_output(&rows, format);

    for table in &report.tables {
        for cascade in table.cascades.iter().filter(|c| !c.applied) {
            print_warning(&format!("{} was not found; nothing rewritten", cascade.reference));
        }
    }
    print_success(&format!(
        "Re-keyed {} row(s), rewrote {} reference(s)",
        report.rows_rekeyed(),
        report.references_rewritten()
    ));
}

fn print_skipped(plan: &MigrationPlan) {
    for skipped in &plan.skipped {
        print_warning(&format!("Skipping {}: {}", skipped.table, skipped.reason));
    }
}
