//! Expense CLI commands
//!
//! Implements CLI commands for recording, editing and listing expenses.

use clap::Subcommand;

use super::{today, FilterArgs};
use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{ExpenseDraft, DATE_INPUT_FORMAT};
use crate::services::{sample_expenses, ExpenseService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount (e.g., "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category (Food, Transportation, Entertainment, Shopping, Bills, Other)
        #[arg(short, long)]
        category: String,
        /// What the money was spent on
        #[arg(short, long)]
        description: String,
        /// Date of the expense (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit an existing expense
    Edit {
        /// Expense ID (full, short, or prefix)
        expense: String,
        /// New amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID (full, short, or prefix)
        expense: String,
    },

    /// Show expense details
    Show {
        /// Expense ID (full, short, or prefix)
        expense: String,
    },

    /// List expenses, newest first
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Show at most this many expenses
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Load demo expenses into an empty store
    Sample,
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> ExpenseResult<()> {
    let mut service = ExpenseService::load(&storage.expenses);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            description,
            date,
        } => {
            let date = date.unwrap_or_else(|| today().format(DATE_INPUT_FORMAT).to_string());
            let expense = service.create(ExpenseDraft::new(amount, category, description, date))?;
            println!(
                "Added {} ({} {} on {})",
                expense.id,
                expense.amount.format_with_symbol(symbol),
                expense.category,
                expense.date.format(DATE_INPUT_FORMAT)
            );
        }

        ExpenseCommands::Edit {
            expense,
            amount,
            category,
            description,
            date,
        } => {
            if amount.is_none() && category.is_none() && description.is_none() && date.is_none() {
                return Err(ExpenseError::Validation(
                    "Nothing to change; pass at least one of --amount, --category, --description, --date".into(),
                ));
            }

            let existing = service.find(&expense)?;
            let id = existing.id;
            let mut draft = ExpenseDraft::from_expense(existing);
            if let Some(amount) = amount {
                draft.amount = amount;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(date) = date {
                draft.date = date;
            }

            let updated = service.edit(id, &draft)?;
            println!("Updated {}", updated.id);
            print!("{}", format_expense_details(&updated, symbol));
        }

        ExpenseCommands::Delete { expense } => {
            let existing = service.find(&expense)?.clone();
            service.delete(existing.id);
            println!("Deleted {} ({})", existing.id, existing.description);
        }

        ExpenseCommands::Show { expense } => {
            let expense = service.find(&expense)?;
            print!("{}", format_expense_details(expense, symbol));
        }

        ExpenseCommands::List { filter, limit } => {
            let mut expenses = service.filtered(&filter.to_filter()?);
            expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
            if let Some(limit) = limit {
                expenses.truncate(limit);
            }
            print!(
                "{}",
                format_expense_list(&expenses, symbol, &settings.date_format)
            );
        }

        ExpenseCommands::Sample => {
            if !service.is_empty() {
                return Err(ExpenseError::Validation(format!(
                    "Sample data is only loaded into an empty store ({} expenses present)",
                    service.len()
                )));
            }
            let added = service.add_many(sample_expenses(today()))?;
            println!("Loaded {} sample expenses", added);
        }
    }

    Ok(())
}
