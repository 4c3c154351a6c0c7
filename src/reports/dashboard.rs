//! Dashboard Report
//!
//! Derives the dashboard summary from the full expense collection and a
//! reference date ("now"). Recomputed from scratch on every call; nothing is
//! cached between mutations.

use chrono::NaiveDate;
use std::io::Write;

use super::breakdown::{CategoryBreakdown, CategoryTotal};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseCategory, Money, Month};

/// Number of entries in `top_categories`
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// Number of months in `monthly_trend`
pub const TREND_MONTHS: usize = 6;

/// Width of the widest trend bar in the terminal view
const BAR_WIDTH: usize = 30;

/// A category's share of total spending
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: Money,
    /// Percent of `total_spending`, 0 when the total is 0
    pub percentage: f64,
}

impl From<&CategoryTotal> for CategoryShare {
    fn from(row: &CategoryTotal) -> Self {
        Self {
            category: row.category,
            amount: row.total,
            percentage: row.percentage,
        }
    }
}

/// Spending in one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: Month,
    pub amount: Money,
}

/// Dashboard summary
#[derive(Debug, Clone)]
pub struct DashboardReport {
    /// Reference date the month figures are relative to
    pub as_of: NaiveDate,
    /// Sum of every amount
    pub total_spending: Money,
    pub expense_count: usize,
    /// Spending in the calendar month of `as_of`
    pub monthly_spending: Money,
    /// Spending in the month before
    pub last_month_spending: Money,
    /// Percent change from last month, `None` when last month is zero
    pub monthly_change: Option<f64>,
    pub category_totals: CategoryBreakdown,
    /// At most [`TOP_CATEGORY_LIMIT`] categories, largest first
    pub top_categories: Vec<CategoryShare>,
    /// [`TREND_MONTHS`] months ending at `as_of`'s month, oldest first
    pub monthly_trend: Vec<MonthlyTotal>,
    /// Total divided by count, rounded to the cent; zero when empty
    pub average_expense: Money,
}

impl DashboardReport {
    /// Generate the dashboard for a collection as of a given date
    pub fn generate(expenses: &[Expense], as_of: NaiveDate) -> Self {
        let this_month = Month::of(as_of);
        let last_month = this_month.prev();

        let sum_in = |month: Month| -> Money {
            expenses
                .iter()
                .filter(|e| month.contains(e.date))
                .map(|e| e.amount)
                .sum()
        };

        let total_spending: Money = expenses.iter().map(|e| e.amount).sum();
        let monthly_spending = sum_in(this_month);
        let last_month_spending = sum_in(last_month);

        let monthly_change = if last_month_spending.is_zero() {
            None
        } else {
            Some((monthly_spending - last_month_spending).percentage_of(last_month_spending))
        };

        let category_totals = CategoryBreakdown::from_expenses(expenses);
        let top_categories = category_totals
            .ranked()
            .into_iter()
            .take(TOP_CATEGORY_LIMIT)
            .map(CategoryShare::from)
            .collect();

        let monthly_trend = this_month
            .trailing(TREND_MONTHS)
            .into_iter()
            .map(|month| MonthlyTotal {
                month,
                amount: sum_in(month),
            })
            .collect();

        Self {
            as_of,
            total_spending,
            expense_count: expenses.len(),
            monthly_spending,
            last_month_spending,
            monthly_change,
            category_totals,
            top_categories,
            monthly_trend,
            average_expense: total_spending.average_over(expenses.len()),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let money = |amount: Money| amount.format_with_symbol(currency_symbol);
        let mut output = String::new();

        output.push_str(&format!("Expense Dashboard (as of {})\n", self.as_of));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Total Spending:",
            money(self.total_spending)
        ));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "This Month:",
            money(self.monthly_spending)
        ));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Last Month:",
            money(self.last_month_spending)
        ));
        if let Some(change) = self.monthly_change {
            output.push_str(&format!("{:<22} {:>13.1}%\n", "Change:", change));
        }
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Expenses:", self.expense_count
        ));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Average Expense:",
            money(self.average_expense)
        ));

        output.push_str("\nTop Categories\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        if self.top_categories.is_empty() {
            output.push_str("  No expenses recorded yet.\n");
        }
        for (rank, share) in self.top_categories.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {:<16} {:>14} {:>7.1}%\n",
                rank + 1,
                share.category,
                money(share.amount),
                share.percentage
            ));
        }

        output.push_str(&format!("\nMonthly Trend (last {} months)\n", TREND_MONTHS));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        let peak = self
            .monthly_trend
            .iter()
            .map(|t| t.amount)
            .max()
            .unwrap_or_default();
        for point in &self.monthly_trend {
            output.push_str(&format!(
                "  {} {} {:>12} {}\n",
                point.month.label(),
                point.month.year,
                money(point.amount),
                bar(point.amount, peak)
            ));
        }

        output
    }

    /// Export the trend and category figures to CSV
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> ExpenseResult<()> {
        let write_err = |e: std::io::Error| ExpenseError::Export(e.to_string());

        writeln!(writer, "Section,Key,Amount,Percentage").map_err(write_err)?;
        writeln!(
            writer,
            "summary,total,{},",
            self.total_spending.to_decimal_string()
        )
        .map_err(write_err)?;
        writeln!(
            writer,
            "summary,this-month,{},",
            self.monthly_spending.to_decimal_string()
        )
        .map_err(write_err)?;
        writeln!(
            writer,
            "summary,last-month,{},",
            self.last_month_spending.to_decimal_string()
        )
        .map_err(write_err)?;
        writeln!(
            writer,
            "summary,average,{},",
            self.average_expense.to_decimal_string()
        )
        .map_err(write_err)?;

        for row in self.category_totals.rows() {
            writeln!(
                writer,
                "category,{},{},{:.2}",
                row.category,
                row.total.to_decimal_string(),
                row.percentage
            )
            .map_err(write_err)?;
        }

        for point in &self.monthly_trend {
            writeln!(
                writer,
                "trend,{},{},",
                point.month,
                point.amount.to_decimal_string()
            )
            .map_err(write_err)?;
        }

        Ok(())
    }
}

fn bar(amount: Money, peak: Money) -> String {
    if !peak.is_positive() || !amount.is_positive() {
        return String::new();
    }
    let width = (amount.cents() as f64 / peak.cents() as f64 * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width.max(1))
}
