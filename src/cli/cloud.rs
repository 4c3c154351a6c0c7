//! Cloud export CLI commands
//!
//! Drives the cloud export simulation. Nothing here touches the network:
//! providers, uploads, e-mails and links are all simulated. Simulation state
//! is loaded from the data directory before a command and saved after it.

use std::io::Write;

use chrono::Utc;
use clap::{Args, Subcommand};

use super::{today, FilterArgs};
use crate::cloud::{
    CloudDestination, CloudExportService, ExportJob, Frequency, RandomSource,
};
use crate::config::Settings;
use crate::display::{
    format_job_history, format_job_progress, format_job_result, format_link_list,
    format_provider_list, format_schedule_list, format_template_list,
};
use crate::error::{ExpenseError, ExpenseResult};
use crate::services::ExpenseService;
use crate::storage::Storage;

const DEFAULT_TEMPLATE: &str = "receipt-backup";

#[derive(Args)]
pub struct CloudArgs {
    /// Skip the simulated upload delays
    #[arg(long, global = true)]
    pub instant: bool,

    #[command(subcommand)]
    pub command: CloudCommands,
}

/// Cloud subcommands
#[derive(Subcommand)]
pub enum CloudCommands {
    /// List export templates, or preview one template's payload
    Templates {
        /// Template ID to preview
        #[arg(long)]
        preview: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List cloud providers and their connection status
    Providers,

    /// Connect a provider (simulated sign-in)
    Connect {
        /// Provider ID (google-drive, dropbox, onedrive, google-sheets, notion)
        provider: String,
    },

    /// Disconnect a provider
    Disconnect {
        /// Provider ID
        provider: String,
    },

    /// E-mail an export
    Email {
        /// Recipient address
        #[arg(id = "recipient", value_name = "TO")]
        to: String,
        /// Template ID
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Export to Google Sheets
    Sheets {
        /// Template ID
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Upload an export to a connected storage provider
    Upload {
        /// Provider ID (google-drive, dropbox, onedrive, google-sheets)
        provider: String,
        /// Template ID
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Create a shareable link to an export
    Share {
        /// Template ID
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,
        /// Stop serving the link after this many opens
        #[arg(long)]
        max_access: Option<u32>,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Schedule a recurring export
    Schedule {
        /// Template ID
        template: String,
        /// How often to run
        #[arg(short, long, value_enum)]
        frequency: Frequency,
        /// Destination (email or a provider ID)
        #[arg(long)]
        to: String,
        /// Recipient address for e-mail schedules
        #[arg(short, long)]
        recipient: Option<String>,
    },

    /// List scheduled exports
    Schedules,

    /// Enable or disable a scheduled export
    Toggle {
        /// Schedule ID (short form or prefix)
        schedule: String,
    },

    /// Run every enabled schedule that is due
    #[command(name = "run-due")]
    RunDue,

    /// Show export history, newest first
    History,

    /// List shareable links
    Links,

    /// Open a shareable link, counting the access
    Open {
        /// Link ID or URL
        link: String,
    },

    /// Revoke a shareable link
    Revoke {
        /// Link ID or URL
        link: String,
    },
}

fn print_progress(job: &ExportJob) {
    print!("\r{}", format_job_progress(job));
    let _ = std::io::stdout().flush();
    if job.is_finished() {
        println!();
    }
}

/// Handle a cloud command
pub fn handle_cloud_command(
    storage: &Storage,
    settings: &Settings,
    args: CloudArgs,
) -> ExpenseResult<()> {
    let expenses = ExpenseService::load(&storage.expenses);
    let source = if args.instant {
        RandomSource::new(&settings.simulation).instant()
    } else {
        RandomSource::new(&settings.simulation)
    };
    let mut cloud = CloudExportService::new(storage.cloud.load()?, source);
    let symbol = settings.currency_symbol.as_str();

    println!("[simulation] No data leaves this machine.");

    match args.command {
        CloudCommands::Templates { preview, filter } => match preview {
            Some(template_id) => {
                let data = cloud.template_data(
                    &expenses.filtered(&filter.to_filter()?),
                    &template_id,
                    today(),
                )?;
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
            None => print!("{}", format_template_list(cloud.templates())),
        },

        CloudCommands::Providers => print!("{}", format_provider_list(cloud.providers())),

        CloudCommands::Connect { provider } => {
            if cloud.connect_provider(&provider)? {
                println!("Connected {}", provider);
            } else {
                println!("Connecting {} failed, try again", provider);
            }
        }

        CloudCommands::Disconnect { provider } => {
            cloud.disconnect_provider(&provider)?;
            println!("Disconnected {}", provider);
        }

        CloudCommands::Email {
            to,
            template,
            filter,
        } => {
            let selected = expenses.filtered(&filter.to_filter()?);
            let job = cloud.send_email(&selected, &template, &to, print_progress)?;
            print!("{}", format_job_result(&job, symbol));
        }

        CloudCommands::Sheets { template, filter } => {
            let selected = expenses.filtered(&filter.to_filter()?);
            let job = cloud.export_to_google_sheets(&selected, &template, print_progress)?;
            print!("{}", format_job_result(&job, symbol));
        }

        CloudCommands::Upload {
            provider,
            template,
            filter,
        } => {
            let destination = match CloudDestination::from_provider(&provider) {
                Some(destination) if destination.provider_id().is_some() => destination,
                _ => {
                    return Err(ExpenseError::Validation(format!(
                        "'{}' is not a storage provider; use `cloud email` or `cloud share`",
                        provider
                    )))
                }
            };
            let selected = expenses.filtered(&filter.to_filter()?);
            let job = cloud.run_export(&selected, &template, destination, None, print_progress)?;
            print!("{}", format_job_result(&job, symbol));
        }

        CloudCommands::Share {
            template,
            max_access,
            filter,
        } => {
            let selected = expenses.filtered(&filter.to_filter()?);
            let job = cloud.create_shareable_link(&selected, &template, print_progress)?;
            if let (Some(max), Some(url)) = (max_access, job.share_url.as_deref()) {
                cloud.limit_link_access(url, max)?;
            }
            print!("{}", format_job_result(&job, symbol));
        }

        CloudCommands::Schedule {
            template,
            frequency,
            to,
            recipient,
        } => {
            let schedule = cloud.schedule_export(&template, frequency, &to, recipient, Utc::now())?;
            println!(
                "Scheduled {} ({} to {}), first run {}",
                schedule.id,
                schedule.frequency,
                schedule.cloud_provider,
                schedule.next_run.format("%Y-%m-%d %H:%M")
            );
        }

        CloudCommands::Schedules => print!("{}", format_schedule_list(cloud.scheduled_exports())),

        CloudCommands::Toggle { schedule } => {
            let enabled = cloud.toggle_schedule(&schedule)?;
            println!(
                "Schedule {} {}",
                schedule,
                if enabled { "enabled" } else { "disabled" }
            );
        }

        CloudCommands::RunDue => {
            let jobs = cloud.run_due_schedules(expenses.get_all(), Utc::now(), print_progress);
            if jobs.is_empty() {
                println!("No scheduled exports are due.");
            }
            for job in &jobs {
                print!("{}", format_job_result(job, symbol));
            }
        }

        CloudCommands::History => print!("{}", format_job_history(&cloud.history())),

        CloudCommands::Links => print!("{}", format_link_list(cloud.share_links(), Utc::now())),

        CloudCommands::Open { link } => {
            let opened = cloud.open_link(&link, Utc::now())?;
            println!("Opened {} ({} access(es))", opened.url, opened.access_count);
        }

        CloudCommands::Revoke { link } => {
            let revoked = cloud.revoke_link(&link)?;
            println!("Revoked {}", revoked.url);
        }
    }

    storage.cloud.save(&cloud.into_state())?;
    Ok(())
}
