//! Cloud simulation display formatting
//!
//! Text views for templates, providers, jobs, schedules and share links.

use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cloud::{CloudProvider, ExportJob, ExportTemplate, JobStatus, ScheduledExport, ShareableLink};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format the built-in export templates
pub fn format_template_list(templates: &[ExportTemplate]) -> String {
    let mut output = String::new();
    for template in templates {
        output.push_str(&format!("{} ({})\n", template.name, template.id));
        output.push_str(&format!("  {}\n", template.description));
        output.push_str(&format!("  Audience: {}\n", template.target_audience));
        output.push_str(&format!("  File:     {}\n", template.default_filename));
    }
    output
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Provider")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Last Sync")]
    last_sync: String,
}

/// Format the provider list with connection status
pub fn format_provider_list(providers: &[CloudProvider]) -> String {
    let rows = providers.iter().map(|p| ProviderRow {
        id: p.id.clone(),
        name: p.name.clone(),
        status: if p.connected { "connected" } else { "disconnected" },
        last_sync: format_time(p.last_sync),
    });
    format!("{}\n", Table::new(rows).with(Style::psql()))
}

/// One-line progress view used while a job runs
pub fn format_job_progress(job: &ExportJob) -> String {
    const BAR_WIDTH: usize = 30;
    let filled = ((job.progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {:>5.1}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        job.progress,
        job.status
    )
}

/// Final report for a finished job
pub fn format_job_result(job: &ExportJob, currency_symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Job:         {}\n", job.id));
    output.push_str(&format!("Template:    {}\n", job.template_id));
    output.push_str(&format!("Destination: {}\n", job.destination));
    if let Some(recipient) = &job.recipient {
        output.push_str(&format!("Recipient:   {}\n", recipient));
    }
    output.push_str(&format!("Status:      {}\n", job.status));
    output.push_str(&format!(
        "Records:     {} ({})\n",
        job.record_count,
        job.total_amount.format_with_symbol(currency_symbol)
    ));

    match job.status {
        JobStatus::Failed => {
            if let Some(message) = &job.error_message {
                output.push_str(&format!("Error:       {}\n", message));
            }
        }
        _ => {
            if let Some(url) = &job.share_url {
                output.push_str(&format!("Share URL:   {}\n", url));
            }
            if job.completed_at.is_some() {
                output.push_str(&format!("Completed:   {}\n", format_time(job.completed_at)));
            }
        }
    }
    output
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Job")]
    id: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Template")]
    template: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Records")]
    records: usize,
}

/// Format the export history (already ordered by the caller)
pub fn format_job_history(jobs: &[&ExportJob]) -> String {
    if jobs.is_empty() {
        return "No exports yet.\n".to_string();
    }

    let rows = jobs.iter().map(|job| JobRow {
        id: job.id.to_string(),
        created: job.created_at.format(DATETIME_FORMAT).to_string(),
        template: job.template_id.clone(),
        destination: job.destination.to_string(),
        status: job.status.to_string(),
        records: job.record_count,
    });
    format!("{}\n", Table::new(rows).with(Style::psql()))
}

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "Schedule")]
    id: String,
    #[tabled(rename = "Template")]
    template: String,
    #[tabled(rename = "Frequency")]
    frequency: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Next Run")]
    next_run: String,
    #[tabled(rename = "Last Run")]
    last_run: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
}

pub fn format_schedule_list(schedules: &[ScheduledExport]) -> String {
    if schedules.is_empty() {
        return "No scheduled exports.\n".to_string();
    }

    let rows = schedules.iter().map(|s| ScheduleRow {
        id: s.id.to_string(),
        template: s.template_id.clone(),
        frequency: s.frequency.to_string(),
        destination: match &s.recipient {
            Some(recipient) => format!("{} ({})", s.cloud_provider, recipient),
            None => s.cloud_provider.clone(),
        },
        next_run: s.next_run.format(DATETIME_FORMAT).to_string(),
        last_run: format_time(s.last_run),
        enabled: if s.enabled { "yes" } else { "no" },
    });
    format!("{}\n", Table::new(rows).with(Style::psql()))
}

pub fn format_link_list(links: &[ShareableLink], now: DateTime<Utc>) -> String {
    if links.is_empty() {
        return "No shareable links.\n".to_string();
    }

    let mut output = String::new();
    for link in links {
        let state = if link.is_expired(now) {
            "expired"
        } else if link.is_available(now) {
            "active"
        } else {
            "limit reached"
        };
        let opened = match link.max_access {
            Some(max) => format!("{} of {}", link.access_count, max),
            None => link.access_count.to_string(),
        };
        output.push_str(&format!("{}  {}\n", link.id, link.url));
        output.push_str(&format!(
            "  {}, expires {}, opened {} time(s)\n",
            state,
            link.expires_at.format(DATETIME_FORMAT),
            opened
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{default_providers, find_template, CloudDestination, Frequency};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_template_list() {
        let output = format_template_list(crate::cloud::templates());
        assert!(output.contains("Tax Report (tax-report)"));
        assert!(output.contains("Audience: Compliance & Audit"));
    }

    #[test]
    fn test_provider_list() {
        let mut providers = default_providers();
        providers[0].connect(now());
        let output = format_provider_list(&providers);
        assert!(output.contains("google-drive"));
        assert!(output.contains("connected"));
        assert!(output.contains("2025-08-15 09:30"));
    }

    #[test]
    fn test_progress_bar() {
        let mut job = ExportJob::new("tax-report", CloudDestination::Dropbox, &[], now());
        assert!(format_job_progress(&job).starts_with(&format!("[{}]", "-".repeat(30))));

        job.advance(50.0, now());
        let line = format_job_progress(&job);
        assert!(line.contains(&"#".repeat(15)));
        assert!(line.contains("50.0%"));
    }

    #[test]
    fn test_job_result_failed_and_shared() {
        let mut failed = ExportJob::new("tax-report", CloudDestination::Dropbox, &[], now());
        failed.fail("boom");
        let output = format_job_result(&failed, "$");
        assert!(output.contains("Error:       boom"));

        let mut shared = ExportJob::new("tax-report", CloudDestination::LinkShare, &[], now());
        shared.advance(100.0, now());
        shared.share_url = Some("https://example.test/x".into());
        let output = format_job_result(&shared, "$");
        assert!(output.contains("Share URL:   https://example.test/x"));
        assert!(output.contains("Completed:"));
    }

    #[test]
    fn test_empty_views() {
        assert_eq!(format_job_history(&[]), "No exports yet.\n");
        assert_eq!(format_schedule_list(&[]), "No scheduled exports.\n");
        assert_eq!(format_link_list(&[], now()), "No shareable links.\n");
    }

    #[test]
    fn test_schedule_and_link_views() {
        let template = find_template("monthly-summary").unwrap();
        let schedule = ScheduledExport::new(
            template.id,
            Frequency::Weekly,
            "email",
            Some("me@example.com".into()),
            now(),
        );
        let output = format_schedule_list(&[schedule]);
        assert!(output.contains("email (me@example.com)"));
        assert!(output.contains("2025-08-22 09:30"));

        let mut link = ShareableLink::new(now());
        let later = now() + chrono::Duration::days(8);
        assert!(format_link_list(&[link.clone()], later).contains("expired"));

        link.max_access = Some(1);
        assert!(format_link_list(&[link.clone()], now()).contains("active, expires"));
        assert!(link.record_access(now()));
        let output = format_link_list(&[link], now());
        assert!(output.contains("limit reached"));
        assert!(output.contains("opened 1 of 1 time(s)"));
    }
}
