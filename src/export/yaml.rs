//! YAML Export functionality
//!
//! Same document as the JSON export, for human-readable archives.

use std::io::Write;

use super::json::ExpenseExport;
use super::ExportOptions;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

/// Export expenses to YAML format
pub fn export_expenses_yaml<W: Write>(
    expenses: &[Expense],
    writer: &mut W,
    options: &ExportOptions,
) -> ExpenseResult<()> {
    let export = ExpenseExport::new(expenses, options);
    let write_err = |e: std::io::Error| ExpenseError::Export(e.to_string());

    writeln!(writer, "# Expense Tracker Export").map_err(write_err)?;
    writeln!(writer, "# Generated: {}", export.export_date).map_err(write_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(write_err)?;
    writeln!(writer, "# Records: {}", export.total_records).map_err(write_err)?;
    writeln!(writer).map_err(write_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| ExpenseError::Export(e.to_string()))?;

    Ok(())
}

/// Import from a YAML export
pub fn import_from_yaml(yaml_str: &str) -> ExpenseResult<ExpenseExport> {
    let export: ExpenseExport =
        serde_yaml::from_str(yaml_str).map_err(|e| ExpenseError::Import(e.to_string()))?;

    export.validate().map_err(ExpenseError::Import)?;

    Ok(export)
}
