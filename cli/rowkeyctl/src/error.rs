//! Error handling and display for the CLI.

use std::path::PathBuf;

use colored::Colorize;
use rowkey_store::StoreError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Migration not confirmed. Re-run with --yes to re-key {tables} table(s).")]
    NotConfirmed { tables: usize },

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    // Check for specific error types and provide hints
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::FileNotFound(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Pass --data/--formats or set data_path in the config file.".yellow()
                );
            }
            CliError::NotConfirmed { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Re-keying rewrites primary and foreign keys and cannot be undone. Back up the data file first."
                        .yellow()
                );
            }
            CliError::Store(StoreError::Migration(_)) => {
                eprintln!(
                    "\n{}",
                    "Hint: Fix the data and run `rowkey migrate` again; nothing was written.".yellow()
                );
            }
            CliError::Store(StoreError::StalePlan) => {
                eprintln!(
                    "\n{}",
                    "Hint: Run `rowkey migrate --dry-run` to review the current plan.".yellow()
                );
            }
            _ => {}
        }
    }
}
