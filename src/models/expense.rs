//! Expense model
//!
//! An expense is a single recorded spending event. Raw user input arrives as
//! an [`ExpenseDraft`] and is validated field by field before an [`Expense`]
//! is ever built from it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::ExpenseId;
use super::money::Money;
use crate::error::ExpenseError;

/// Maximum number of characters in a description
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Largest amount a single expense may record
pub const MAX_AMOUNT: Money = Money::from_cents(1_000_000_000_000);

/// Date format accepted for user input and written to exports
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier, never reassigned
    pub id: ExpenseId,

    /// Amount spent, always positive
    pub amount: Money,

    pub category: ExpenseCategory,

    /// What the money was spent on
    pub description: String,

    /// Day the expense occurred (user-editable)
    pub date: NaiveDate,

    /// When the record was created, immutable
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with a fresh id and creation timestamp
    pub fn new(
        amount: Money,
        category: ExpenseCategory,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            amount,
            category,
            description: description.into(),
            date,
            created_at: Utc::now(),
        }
    }

    /// Validate the model invariants
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_AMOUNT {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }

        let length = self.description.chars().count();
        if length > MAX_DESCRIPTION_LEN {
            return Err(ExpenseValidationError::DescriptionTooLong { length });
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format(DATE_INPUT_FORMAT),
            self.category,
            self.amount,
            self.description
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyDescription,
    DescriptionTooLong { length: usize },
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be positive (got {})", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} exceeds the limit of {}", amount, MAX_AMOUNT)
            }
            Self::EmptyDescription => write!(f, "Description cannot be empty"),
            Self::DescriptionTooLong { length } => write!(
                f,
                "Description is {} characters; the limit is {}",
                length, MAX_DESCRIPTION_LEN
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

impl From<ExpenseValidationError> for ExpenseError {
    fn from(err: ExpenseValidationError) -> Self {
        ExpenseError::Validation(err.to_string())
    }
}

/// Raw form input for an expense, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

/// Validated field values extracted from a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFields {
    pub amount: Money,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    /// Pre-fill a draft from an existing expense (the edit form)
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.to_decimal_string(),
            category: expense.category.to_string(),
            description: expense.description.clone(),
            date: expense.date.format(DATE_INPUT_FORMAT).to_string(),
        }
    }

    /// Validate every field, collecting all failures
    pub fn validate(&self) -> Result<ExpenseFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        let amount = if self.amount.trim().is_empty() {
            errors.push("amount", "Amount is required");
            None
        } else {
            match Money::parse(&self.amount) {
                Ok(amount) if amount > MAX_AMOUNT => {
                    errors.push(
                        "amount",
                        format!("Amount must not exceed {}", MAX_AMOUNT),
                    );
                    None
                }
                Ok(amount) if amount.is_positive() => Some(amount),
                _ => {
                    errors.push("amount", "Amount must be a positive number");
                    None
                }
            }
        };

        let category = if self.category.trim().is_empty() {
            errors.push("category", "Category is required");
            None
        } else {
            match self.category.parse::<ExpenseCategory>() {
                Ok(category) => Some(category),
                Err(e) => {
                    errors.push("category", e.to_string());
                    None
                }
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors.push("description", "Description is required");
        } else if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(
                "description",
                format!(
                    "Description must be less than {} characters",
                    MAX_DESCRIPTION_LEN
                ),
            );
        }

        let date = if self.date.trim().is_empty() {
            errors.push("date", "Date is required");
            None
        } else {
            match NaiveDate::parse_from_str(self.date.trim(), DATE_INPUT_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("date", "Date must be in YYYY-MM-DD format");
                    None
                }
            }
        };

        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) if errors.is_empty() => {
                Ok(ExpenseFields {
                    amount,
                    category,
                    description: description.to_string(),
                    date,
                })
            }
            _ => Err(errors),
        }
    }

    /// Build a brand new expense from the draft
    pub fn into_expense(self) -> Result<Expense, FieldErrors> {
        let fields = self.validate()?;
        Ok(Expense::new(
            fields.amount,
            fields.category,
            fields.description,
            fields.date,
        ))
    }

    /// Apply the draft over an existing expense, keeping its id and creation time
    pub fn apply_to(&self, existing: &Expense) -> Result<Expense, FieldErrors> {
        let fields = self.validate()?;
        Ok(Expense {
            id: existing.id,
            amount: fields.amount,
            category: fields.category,
            description: fields.description,
            date: fields.date,
            created_at: existing.created_at,
        })
    }
}

/// A validation message attached to one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field-level failures of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Message for a given field, if it failed
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<FieldErrors> for ExpenseError {
    fn from(errors: FieldErrors) -> Self {
        ExpenseError::Validation(errors.to_string())
    }
}
