//! CLI command handlers
//!
//! Each submodule defines its clap subcommands and a `handle_*_command`
//! function that runs them against [`Storage`](crate::storage::Storage).

pub mod cloud;
pub mod expense;
pub mod export;
pub mod import;
pub mod report;

use chrono::NaiveDate;
use clap::Args;

use crate::error::{ExpenseError, ExpenseResult};
use crate::services::{parse_category_filter, ExpenseFilter};

pub use cloud::{handle_cloud_command, CloudArgs, CloudCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportArgs};
pub use import::{handle_import_command, ImportArgs};
pub use report::{handle_dashboard_command, DashboardArgs};

/// Filter flags shared by `list`, `export` and the cloud commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Category to keep ("All" for every category)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Earliest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Case-insensitive text to look for in descriptions and categories
    #[arg(short, long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ExpenseResult<ExpenseFilter> {
        let mut filter = ExpenseFilter::new();

        if let Some(category) = &self.category {
            if let Some(category) = parse_category_filter(category)
                .map_err(|e| ExpenseError::Validation(e.to_string()))?
            {
                filter = filter.category(category);
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ExpenseError::Validation(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
        }
        if let Some(from) = self.from {
            filter = filter.start_date(from);
        }
        if let Some(to) = self.to {
            filter = filter.end_date(to);
        }
        if let Some(search) = &self.search {
            filter = filter.search(search.clone());
        }

        Ok(filter)
    }
}

/// Today's date in local time
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseCategory;

    #[test]
    fn test_filter_args() {
        let args = FilterArgs {
            category: Some("food".into()),
            from: NaiveDate::from_ymd_opt(2025, 8, 1),
            to: None,
            search: Some("  ".into()),
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.category, Some(ExpenseCategory::Food));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert!(filter.search_term.is_none());

        let all = FilterArgs {
            category: Some("All".into()),
            ..FilterArgs::default()
        };
        assert!(all.to_filter().unwrap().is_empty());
    }

    #[test]
    fn test_filter_args_rejects_bad_input() {
        let bad_category = FilterArgs {
            category: Some("Groceries".into()),
            ..FilterArgs::default()
        };
        assert!(bad_category.to_filter().unwrap_err().is_validation());

        let reversed = FilterArgs {
            from: NaiveDate::from_ymd_opt(2025, 8, 10),
            to: NaiveDate::from_ymd_opt(2025, 8, 1),
            ..FilterArgs::default()
        };
        assert!(reversed.to_filter().is_err());
    }
}
