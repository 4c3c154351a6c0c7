//! Import CLI command

use std::path::PathBuf;

use clap::Args;

use crate::error::ExpenseResult;
use crate::services::{ExpenseService, ImportService};
use crate::storage::Storage;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV, JSON or YAML export to read (chosen by extension)
    pub file: PathBuf,
}

/// Handle the import command
pub fn handle_import_command(storage: &Storage, args: ImportArgs) -> ExpenseResult<()> {
    let mut service = ExpenseService::load(&storage.expenses);
    let result = ImportService::new(&mut service).import_file(&args.file)?;

    println!("Imported {} expense(s)", result.imported);
    if result.duplicates_skipped > 0 {
        println!("Skipped {} duplicate(s)", result.duplicates_skipped);
    }
    if !result.is_clean() {
        println!("Rejected {} row(s):", result.error_count());
        for (line, message) in &result.errors {
            println!("  line {}: {}", line, message);
        }
    }

    Ok(())
}
