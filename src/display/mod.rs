//! Display formatting for terminal output
//!
//! Provides utilities for formatting expenses and cloud simulation state for
//! terminal display.

pub mod cloud;
pub mod expense;

pub use cloud::{
    format_job_history, format_job_progress, format_job_result, format_link_list,
    format_provider_list, format_schedule_list, format_template_list,
};
pub use expense::{format_expense_details, format_expense_list};
