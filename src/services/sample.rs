//! Demo data for an empty store

use chrono::{Days, NaiveDate};

use crate::models::{Expense, ExpenseCategory, Money};

/// (cents, category, description, days before today)
const SAMPLE_ROWS: [(i64, ExpenseCategory, &str, u64); 10] = [
    (1250, ExpenseCategory::Food, "Coffee and pastry", 0),
    (4500, ExpenseCategory::Transportation, "Gas for car", 1),
    (2599, ExpenseCategory::Entertainment, "Movie tickets", 2),
    (8999, ExpenseCategory::Shopping, "New shoes", 3),
    (12000, ExpenseCategory::Bills, "Electric bill", 5),
    (1575, ExpenseCategory::Food, "Lunch at restaurant", 6),
    (899, ExpenseCategory::Other, "Phone case", 7),
    (3550, ExpenseCategory::Food, "Groceries", 8),
    (7500, ExpenseCategory::Transportation, "Public transit monthly pass", 14),
    (2299, ExpenseCategory::Entertainment, "Streaming service subscription", 18),
];

/// Ten demo expenses dated relative to `today`
pub fn sample_expenses(today: NaiveDate) -> Vec<Expense> {
    SAMPLE_ROWS
        .iter()
        .map(|&(cents, category, description, days_ago)| {
            let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
            Expense::new(Money::from_cents(cents), category, description, date)
        })
        .collect()
}
