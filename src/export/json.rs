//! JSON Export functionality
//!
//! Exports expenses with a category summary and schema versioning. The same
//! structure is reused by the YAML export and read back by the importer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use super::ExportOptions;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseCategory, ExpenseId, Money, MAX_AMOUNT};
use crate::reports::CategoryBreakdown;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Expense export document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub export_date: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub total_records: usize,

    /// Sum of all amounts in currency units
    pub total_amount: f64,

    pub expenses: Vec<ExportedExpense>,

    pub summary: ExportSummary,
}

/// One expense as written to an export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedExpense {
    pub id: ExpenseId,
    /// Amount in currency units (12.5 for $12.50)
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Amount with currency symbol, for display only
    #[serde(default)]
    pub formatted_amount: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Keyed by category name
    pub by_category: BTreeMap<String, CategorySummary>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    pub total: f64,
    pub percentage: f64,
}

/// Earliest and latest expense dates, both null for an empty export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl ExportedExpense {
    fn from_expense(expense: &Expense, currency_symbol: &str) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount.as_f64(),
            category: expense.category,
            description: expense.description.clone(),
            date: expense.date,
            created_at: expense.created_at,
            formatted_amount: expense.amount.format_with_symbol(currency_symbol),
        }
    }

    /// Rebuild the stored expense, checking the model invariants
    pub fn to_expense(&self) -> Result<Expense, String> {
        if !self.amount.is_finite() || self.amount.abs() > MAX_AMOUNT.as_f64() {
            return Err(format!("Expense {} has an invalid amount", self.id));
        }

        let expense = Expense {
            id: self.id,
            amount: Money::from_cents((self.amount * 100.0).round() as i64),
            category: self.category,
            description: self.description.clone(),
            date: self.date,
            created_at: self.created_at,
        };
        expense
            .validate()
            .map_err(|e| format!("Expense {}: {}", self.id, e))?;
        Ok(expense)
    }
}

impl ExpenseExport {
    /// Build an export document for `expenses`
    pub fn new(expenses: &[Expense], options: &ExportOptions) -> Self {
        let breakdown = CategoryBreakdown::from_expenses(expenses);

        let by_category = breakdown
            .rows()
            .iter()
            .map(|row| {
                (
                    row.category.to_string(),
                    CategorySummary {
                        count: row.count,
                        total: row.total.as_f64(),
                        percentage: row.percentage,
                    },
                )
            })
            .collect();

        let date_range = DateRange {
            earliest: expenses.iter().map(|e| e.date).min(),
            latest: expenses.iter().map(|e| e.date).max(),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            export_date: options.generated_at,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            total_records: expenses.len(),
            total_amount: breakdown.total().as_f64(),
            expenses: expenses
                .iter()
                .map(|e| ExportedExpense::from_expense(e, &options.currency_symbol))
                .collect(),
            summary: ExportSummary {
                by_category,
                date_range,
            },
        }
    }

    /// Accept any export sharing the current major schema version
    pub fn check_version(&self) -> Result<(), String> {
        let expected_major = EXPORT_SCHEMA_VERSION.split('.').next();
        if self.schema_version.split('.').next() != expected_major {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }
        Ok(())
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        self.check_version()?;

        if self.total_records != self.expenses.len() {
            return Err(format!(
                "Record count mismatch: header says {}, found {}",
                self.total_records,
                self.expenses.len()
            ));
        }

        for record in &self.expenses {
            record.to_expense()?;
        }

        Ok(())
    }

    /// The expenses contained in the export
    pub fn to_expenses(&self) -> Result<Vec<Expense>, String> {
        self.expenses.iter().map(ExportedExpense::to_expense).collect()
    }
}

/// Export expenses to JSON
pub fn export_expenses_json<W: Write>(
    expenses: &[Expense],
    writer: &mut W,
    options: &ExportOptions,
) -> ExpenseResult<()> {
    let export = ExpenseExport::new(expenses, options);

    if options.pretty_json {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| ExpenseError::Export(e.to_string()))?;

    Ok(())
}

/// Import from a JSON export
pub fn import_from_json(json_str: &str) -> ExpenseResult<ExpenseExport> {
    let export: ExpenseExport =
        serde_json::from_str(json_str).map_err(|e| ExpenseError::Import(e.to_string()))?;

    export.validate().map_err(ExpenseError::Import)?;

    Ok(export)
}
