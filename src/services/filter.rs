//! Expense filtering
//!
//! A filter is a conjunction of optional constraints. An empty filter keeps
//! every expense, and applying a filter twice gives the same result as once.

use chrono::NaiveDate;

use crate::models::{CategoryParseError, Expense, ExpenseCategory};

/// Filter options for listing and exporting expenses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Exact category match; `None` means all categories
    pub category: Option<ExpenseCategory>,
    /// Inclusive lower bound on `date`
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `date`
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring of the description or category name
    pub search_term: Option<String>,
}

impl ExpenseFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Filter by date range (both ends inclusive)
    pub fn date_range(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date(start).end_date(end)
    }

    /// Search descriptions and category names; blank terms are ignored
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }

    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.search_needle().is_none()
    }

    fn search_needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Check a single expense against every constraint
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.category.is_some_and(|c| c != expense.category) {
            return false;
        }
        if self.start_date.is_some_and(|start| expense.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| expense.date > end) {
            return false;
        }
        if let Some(needle) = self.search_needle() {
            let in_description = expense.description.to_lowercase().contains(&needle);
            let in_category = expense.category.as_str().to_lowercase().contains(&needle);
            if !in_description && !in_category {
                return false;
            }
        }
        true
    }

    /// Keep the matching expenses, preserving order
    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

/// Parse a category selector where "All" (or blank) means no constraint
pub fn parse_category_filter(value: &str) -> Result<Option<ExpenseCategory>, CategoryParseError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            Expense::new(Money::from_cents(1250), ExpenseCategory::Food, "Coffee and pastry", date(2025, 8, 15)),
            Expense::new(Money::from_cents(4500), ExpenseCategory::Transportation, "Gas for car", date(2025, 8, 14)),
            Expense::new(Money::from_cents(2599), ExpenseCategory::Entertainment, "Movie tickets", date(2025, 8, 13)),
            Expense::new(Money::from_cents(3550), ExpenseCategory::Food, "Groceries", date(2025, 8, 7)),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let expenses = sample();
        let filter = ExpenseFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&expenses), expenses);
    }

    #[test]
    fn test_category() {
        let filtered = ExpenseFilter::new()
            .category(ExpenseCategory::Food)
            .apply(&sample());
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.category == ExpenseCategory::Food));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filtered = ExpenseFilter::new()
            .date_range(date(2025, 8, 7), date(2025, 8, 13))
            .apply(&sample());
        let descriptions: Vec<_> = filtered.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Movie tickets", "Groceries"]);

        let only_start = ExpenseFilter::new().start_date(date(2025, 8, 14)).apply(&sample());
        assert_eq!(only_start.len(), 2);
    }

    #[test]
    fn test_search_description_and_category() {
        let expenses = sample();

        let by_description = ExpenseFilter::new().search("COFFEE").apply(&expenses);
        assert_eq!(by_description.len(), 1);

        let by_category = ExpenseFilter::new().search("transport").apply(&expenses);
        assert_eq!(by_category[0].description, "Gas for car");

        assert!(ExpenseFilter::new().search("   ").is_empty());
        assert!(ExpenseFilter::new().search("zzz").apply(&expenses).is_empty());
    }

    #[test]
    fn test_conditions_are_anded() {
        let filtered = ExpenseFilter::new()
            .category(ExpenseCategory::Food)
            .search("groc")
            .end_date(date(2025, 8, 10))
            .apply(&sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].description, "Groceries");
    }

    #[test]
    fn test_idempotent() {
        let filter = ExpenseFilter::new().search("o").start_date(date(2025, 8, 10));
        let once = filter.apply(&sample());
        assert_eq!(filter.apply(&once), once);
    }

    #[test]
    fn test_parse_category_filter() {
        assert_eq!(parse_category_filter("All").unwrap(), None);
        assert_eq!(parse_category_filter("").unwrap(), None);
        assert_eq!(
            parse_category_filter("bills").unwrap(),
            Some(ExpenseCategory::Bills)
        );
        assert!(parse_category_filter("Groceries").is_err());
    }
}
