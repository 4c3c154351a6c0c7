//! Export module for the expense tracker
//!
//! Turns a (usually filtered) slice of expenses into a downloadable document:
//! - CSV: spreadsheet-compatible rows
//! - JSON: machine-readable records plus a category summary
//! - YAML: the JSON structure in human-readable form
//! - PDF: a printable report with summary and detail tables
//!
//! An empty slice always yields a valid, empty document.

pub mod csv;
pub mod json;
pub mod pdf;
pub mod yaml;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

pub use self::csv::export_expenses_csv;
pub use self::json::{
    export_expenses_json, import_from_json, CategorySummary, DateRange, ExpenseExport,
    ExportSummary, ExportedExpense, EXPORT_SCHEMA_VERSION,
};
pub use self::pdf::{export_expenses_pdf, render_expense_report, PdfDocument};
pub use self::yaml::{export_expenses_yaml, import_from_yaml};

/// Supported export formats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Yaml,
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

/// Presentation knobs shared by all formats
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub currency_symbol: String,
    pub pretty_json: bool,
    /// Timestamp written into document headers
    pub generated_at: DateTime<Utc>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            pretty_json: true,
            generated_at: Utc::now(),
        }
    }
}

impl ExportOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            currency_symbol: settings.currency_symbol.clone(),
            pretty_json: settings.export.pretty_json,
            generated_at: Utc::now(),
        }
    }
}

/// Write `expenses` to `writer` in the given format
pub fn export_expenses<W: Write>(
    expenses: &[Expense],
    format: ExportFormat,
    writer: &mut W,
    options: &ExportOptions,
) -> ExpenseResult<()> {
    match format {
        ExportFormat::Csv => export_expenses_csv(expenses, writer),
        ExportFormat::Json => export_expenses_json(expenses, writer, options),
        ExportFormat::Yaml => export_expenses_yaml(expenses, writer, options),
        ExportFormat::Pdf => export_expenses_pdf(expenses, writer, options),
    }
}

/// Default base filename: `expenses-YYYY-MM-DD`
pub fn default_base_name(today: NaiveDate) -> String {
    format!("expenses-{}", today.format("%Y-%m-%d"))
}

/// `<base>.<extension>`
pub fn export_filename(base: &str, format: ExportFormat) -> String {
    format!("{}.{}", base, format.extension())
}

/// Export into `<dir>/<base>.<extension>`, returning the written path
pub fn write_export_file(
    expenses: &[Expense],
    format: ExportFormat,
    dir: &Path,
    base: &str,
    options: &ExportOptions,
) -> ExpenseResult<PathBuf> {
    if base.trim().is_empty() {
        return Err(ExpenseError::Export("Filename must not be empty".into()));
    }

    fs::create_dir_all(dir).map_err(|e| {
        ExpenseError::Export(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(export_filename(base.trim(), format));
    let file = File::create(&path)
        .map_err(|e| ExpenseError::Export(format!("Failed to create {}: {}", path.display(), e)))?;

    let mut writer = BufWriter::new(file);
    export_expenses(expenses, format, &mut writer, options)?;
    writer
        .flush()
        .map_err(|e| ExpenseError::Export(e.to_string()))?;

    Ok(path)
}
