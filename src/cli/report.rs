//! Dashboard CLI command

use chrono::NaiveDate;
use clap::Args;

use super::today;
use crate::config::Settings;
use crate::error::ExpenseResult;
use crate::services::ExpenseService;
use crate::storage::Storage;

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Compute month figures as of this date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Write the dashboard as CSV instead of text
    #[arg(long)]
    pub csv: bool,
}

/// Handle the dashboard command
pub fn handle_dashboard_command(
    storage: &Storage,
    settings: &Settings,
    args: DashboardArgs,
) -> ExpenseResult<()> {
    let service = ExpenseService::load(&storage.expenses);
    let report = service.dashboard(args.as_of.unwrap_or_else(today));

    if args.csv {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        report.export_csv(&mut handle)?;
    } else {
        print!("{}", report.format_terminal(&settings.currency_symbol));
    }

    Ok(())
}
