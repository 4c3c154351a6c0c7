//! Per-category totals
//!
//! Shared by the dashboard, the JSON/YAML summary, the PDF summary table and
//! the cloud template payloads so every surface agrees on the numbers.

use crate::models::{Expense, ExpenseCategory, Money};

/// Count and sum of one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    /// Number of expenses in this category
    pub count: usize,
    pub total: Money,
    /// Share of the overall total, 0.0..=100.0 (0 when the total is 0)
    pub percentage: f64,
}

/// Category totals in first-appearance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBreakdown {
    rows: Vec<CategoryTotal>,
    total: Money,
}

impl CategoryBreakdown {
    /// Aggregate the expenses, one row per category that occurs
    pub fn from_expenses<'a, I>(expenses: I) -> Self
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut rows: Vec<CategoryTotal> = Vec::new();
        let mut total = Money::zero();

        for expense in expenses {
            total += expense.amount;
            match rows.iter_mut().find(|row| row.category == expense.category) {
                Some(row) => {
                    row.count += 1;
                    row.total += expense.amount;
                }
                None => rows.push(CategoryTotal {
                    category: expense.category,
                    count: 1,
                    total: expense.amount,
                    percentage: 0.0,
                }),
            }
        }

        for row in &mut rows {
            row.percentage = row.total.percentage_of(total);
        }

        Self { rows, total }
    }

    pub fn rows(&self) -> &[CategoryTotal] {
        &self.rows
    }

    pub fn get(&self, category: ExpenseCategory) -> Option<&CategoryTotal> {
        self.rows.iter().find(|row| row.category == category)
    }

    /// Sum for a category, zero when it has no expenses
    pub fn total_for(&self, category: ExpenseCategory) -> Money {
        self.get(category).map(|row| row.total).unwrap_or_default()
    }

    /// Rows sorted by amount, largest first; ties keep first-appearance order
    pub fn ranked(&self) -> Vec<&CategoryTotal> {
        let mut ranked: Vec<&CategoryTotal> = self.rows.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.total.cmp(&a.total));
        ranked
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(cents: i64, category: ExpenseCategory) -> Expense {
        Expense::new(
            Money::from_cents(cents),
            category,
            "test",
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        )
    }

    #[test]
    fn test_first_appearance_order() {
        let expenses = vec![
            expense(500, ExpenseCategory::Shopping),
            expense(1000, ExpenseCategory::Food),
            expense(700, ExpenseCategory::Shopping),
        ];
        let breakdown = CategoryBreakdown::from_expenses(&expenses);

        let categories: Vec<_> = breakdown.rows().iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![ExpenseCategory::Shopping, ExpenseCategory::Food]);

        let shopping = breakdown.get(ExpenseCategory::Shopping).unwrap();
        assert_eq!(shopping.count, 2);
        assert_eq!(shopping.total.cents(), 1200);
        assert_eq!(breakdown.total().cents(), 2200);
        assert_eq!(breakdown.total_for(ExpenseCategory::Bills), Money::zero());
    }

    #[test]
    fn test_ranked_is_stable_on_ties() {
        let expenses = vec![
            expense(1000, ExpenseCategory::Other),
            expense(2000, ExpenseCategory::Bills),
            expense(1000, ExpenseCategory::Food),
        ];
        let breakdown = CategoryBreakdown::from_expenses(&expenses);

        let ranked: Vec<_> = breakdown.ranked().iter().map(|r| r.category).collect();
        assert_eq!(
            ranked,
            vec![
                ExpenseCategory::Bills,
                ExpenseCategory::Other,
                ExpenseCategory::Food
            ]
        );
    }

    #[test]
    fn test_percentages() {
        let expenses = vec![
            expense(2500, ExpenseCategory::Food),
            expense(7500, ExpenseCategory::Bills),
        ];
        let breakdown = CategoryBreakdown::from_expenses(&expenses);

        assert!((breakdown.get(ExpenseCategory::Food).unwrap().percentage - 25.0).abs() < 1e-9);
        let sum: f64 = breakdown.rows().iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty() {
        let breakdown = CategoryBreakdown::from_expenses(std::iter::empty());
        assert!(breakdown.is_empty());
        assert!(breakdown.total().is_zero());
        assert!(breakdown.ranked().is_empty());
    }
}
