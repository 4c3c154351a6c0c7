//! Expense categories
//!
//! The category set is closed: every expense belongs to exactly one of the
//! six variants below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category an expense is grouped under for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Bills,
    Other,
}

impl ExpenseCategory {
    /// Every category, in display order
    pub const ALL: [ExpenseCategory; 6] = [
        Self::Food,
        Self::Transportation,
        Self::Entertainment,
        Self::Shopping,
        Self::Bills,
        Self::Other,
    ];

    /// Get all categories in display order
    pub fn all() -> &'static [ExpenseCategory] {
        &Self::ALL
    }

    /// The canonical name ("Food", "Transportation", ...)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Other => "Other",
        }
    }

    /// Categories typically deductible in a tax report
    pub fn is_tax_deductible(&self) -> bool {
        matches!(self, Self::Transportation | Self::Bills)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = CategoryParseError;

    /// Case-insensitive parse of a category name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CategoryParseError(needle.to_string()))
    }
}

/// Error returned when a string names no known category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category '{}'", self.0)
    }
}

impl std::error::Error for CategoryParseError {}
