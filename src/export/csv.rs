//! CSV Export functionality
//!
//! One header row, then one row per expense in collection order.

use chrono::SecondsFormat;
use std::io::Write;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

/// Column header line
pub const CSV_HEADER: &str = "Date,Amount,Category,Description,Created At";

/// Export expenses to CSV
///
/// Descriptions are always quoted; `createdAt` is written as RFC 3339.
pub fn export_expenses_csv<W: Write>(expenses: &[Expense], writer: &mut W) -> ExpenseResult<()> {
    writeln!(writer, "{}", CSV_HEADER).map_err(|e| ExpenseError::Export(e.to_string()))?;

    for expense in expenses {
        writeln!(
            writer,
            "{},{},{},{},{}",
            expense.date,
            expense.amount.to_decimal_string(),
            expense.category,
            quote_field(&expense.description),
            expense
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        )
        .map_err(|e| ExpenseError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Wrap in double quotes, doubling any inside
fn quote_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
