//! Core data models for the expense tracker
//!
//! This module contains the data structures of the expense domain: the
//! expense record, its closed category set, money, ids and calendar months.

pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use category::{CategoryParseError, ExpenseCategory};
pub use expense::{
    Expense, ExpenseDraft, ExpenseFields, ExpenseValidationError, FieldError, FieldErrors,
    DATE_INPUT_FORMAT, MAX_AMOUNT, MAX_DESCRIPTION_LEN,
};
pub use ids::{ExpenseId, ExportJobId, ScheduleId, ShareLinkId};
pub use money::{Money, MoneyParseError};
pub use period::Month;
