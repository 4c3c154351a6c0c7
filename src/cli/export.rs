//! Export CLI command
//!
//! Writes the (filtered) collection to a file, or to stdout with `--stdout`.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::{today, FilterArgs};
use crate::config::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::export::{default_base_name, export_expenses, write_export_file, ExportFormat, ExportOptions};
use crate::services::ExpenseService;
use crate::storage::Storage;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format (defaults to the configured format)
    #[arg(value_enum)]
    pub format: Option<ExportFormat>,

    /// Base filename without extension (default expenses-YYYY-MM-DD)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory to write into (default <base dir>/exports)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long, conflicts_with_all = ["output", "dir"])]
    pub stdout: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Handle the export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    args: ExportArgs,
) -> ExpenseResult<()> {
    let service = ExpenseService::load(&storage.expenses);
    let expenses = service.filtered(&args.filter.to_filter()?);
    let format = args.format.unwrap_or(settings.export.default_format);
    let options = ExportOptions::from_settings(settings);

    if args.stdout {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        export_expenses(&expenses, format, &mut handle, &options)?;
        handle
            .flush()
            .map_err(|e| ExpenseError::Export(e.to_string()))?;
        return Ok(());
    }

    let base = args.output.unwrap_or_else(|| default_base_name(today()));
    let dir = args.dir.unwrap_or_else(|| storage.paths().exports_dir());
    let path = write_export_file(&expenses, format, &dir, &base, &options)?;

    println!(
        "Exported {} expense(s) as {} to {}",
        expenses.len(),
        format.extension().to_uppercase(),
        path.display()
    );
    Ok(())
}
