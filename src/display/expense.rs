//! Expense display formatting
//!
//! Renders the expense list as a table and a single expense as a detail view.

use std::fmt::Write;

use tabled::settings::{object::Columns, Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Expense, Money, DATE_INPUT_FORMAT};

/// Maximum description width in the list view
const DESCRIPTION_WIDTH: usize = 40;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl ExpenseRow {
    fn new(expense: &Expense, currency_symbol: &str, date_format: &str) -> Self {
        Self {
            id: expense.id.to_string(),
            date: format_date(expense, date_format),
            category: expense.category.to_string(),
            amount: expense.amount.format_with_symbol(currency_symbol),
            description: truncate(&expense.description, DESCRIPTION_WIDTH),
        }
    }
}

/// Render the date with the configured format, or ISO form if chrono rejects it
fn format_date(expense: &Expense, date_format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", expense.date.format(date_format)).is_err() {
        return expense.date.format(DATE_INPUT_FORMAT).to_string();
    }
    rendered
}

/// Format a list of expenses as a table with a total line
pub fn format_expense_list(expenses: &[Expense], currency_symbol: &str, date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows: Vec<ExpenseRow> = expenses
        .iter()
        .map(|e| ExpenseRow::new(e, currency_symbol, date_format))
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::single(3), Alignment::right());

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\n\n{} expense(s), total {}\n",
        table,
        expenses.len(),
        total.format_with_symbol(currency_symbol)
    )
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("UUID:        {}\n", expense.id.as_uuid()));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!("Description: {}\n", expense.description));
    output.push_str(&format!(
        "Created:     {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

/// Truncate to `max` characters, ending with "..." when shortened
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
