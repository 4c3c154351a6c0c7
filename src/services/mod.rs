//! Service layer for the expense tracker
//!
//! Services sit between the CLI and storage: they own the in-memory
//! collection for a session, validate input and decide when to persist.

pub mod expense;
pub mod filter;
pub mod import;
pub mod sample;

pub use expense::ExpenseService;
pub use filter::{parse_category_filter, ExpenseFilter};
pub use import::{ColumnMapping, ImportFormat, ImportResult, ImportService};
pub use sample::sample_expenses;
