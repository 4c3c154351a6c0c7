use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use expense_tracker::cli::{
    handle_cloud_command, handle_dashboard_command, handle_expense_command,
    handle_export_command, handle_import_command, CloudArgs, DashboardArgs, ExpenseCommands,
    ExportArgs, ImportArgs,
};
use expense_tracker::config::paths::{TrackerPaths, DATA_DIR_ENV};
use expense_tracker::config::Settings;
use expense_tracker::logging::init_logging;
use expense_tracker::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "expenses",
    version,
    about = "Terminal-based personal expense tracker",
    long_about = "Record expenses, explore them with filters and a dashboard, and \
                  export them as CSV, JSON, YAML or PDF. Cloud exports are a local \
                  simulation; nothing is uploaded."
)]
struct Cli {
    /// Base directory for settings and data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize settings and an empty expense store
    Init,

    /// Show current configuration and paths
    Config,

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Show spending dashboard
    Dashboard(DashboardArgs),

    /// Export expenses to a file
    Export(ExportArgs),

    /// Import expenses from a CSV, JSON or YAML export
    Import(ImportArgs),

    /// Simulated cloud export, sharing and scheduling
    Cloud(CloudArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = match cli.data_dir {
        Some(dir) => TrackerPaths::with_base_dir(dir),
        None => TrackerPaths::new().context("resolving the data directory")?,
    };
    let settings = Settings::load_or_create(&paths).context("loading settings")?;
    let storage = Storage::new(paths.clone()).context("opening storage")?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing expense tracker at: {}", paths.base_dir().display());
            if initialize_storage(&paths)? {
                println!("Initialization complete!");
            } else {
                println!("Already initialized; nothing was changed.");
            }
            println!();
            println!("Run 'expenses expense sample' to load demo data.");
        }
        Some(Commands::Config) => {
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Expenses file:    {}", paths.expenses_file().display());
            println!("Exports directory: {}", paths.exports_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
            println!("  Export format:    {}", settings.export.default_format);
            println!("  Pretty JSON:      {}", settings.export.pretty_json);
            println!("  Failure rate:     {}", settings.simulation.failure_rate);
            println!(
                "  Connect success:  {}",
                settings.simulation.connect_success_rate
            );
            println!("  Realtime delays:  {}", settings.simulation.realtime);
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Dashboard(args)) => {
            handle_dashboard_command(&storage, &settings, args)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&storage, &settings, args)?;
        }
        Some(Commands::Import(args)) => {
            handle_import_command(&storage, args)?;
        }
        Some(Commands::Cloud(args)) => {
            handle_cloud_command(&storage, &settings, args)?;
        }
        None => {
            println!("Expense Tracker - personal expenses from the terminal");
            println!();
            println!("Run 'expenses --help' for usage information.");
        }
    }

    Ok(())
}
