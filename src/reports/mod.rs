//! Reports module for the expense tracker
//!
//! Derived views over the expense collection: per-category totals and the
//! dashboard summary.

pub mod breakdown;
pub mod dashboard;

pub use breakdown::{CategoryBreakdown, CategoryTotal};
pub use dashboard::{
    CategoryShare, DashboardReport, MonthlyTotal, TOP_CATEGORY_LIMIT, TREND_MONTHS,
};
