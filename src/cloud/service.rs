//! Cloud export service
//!
//! Owns all simulation state (jobs, schedules, links, providers) for one
//! session. The CLI loads a [`CloudState`] from disk, wraps it in a service
//! for one command and saves it back afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::job::{CloudDestination, ExportJob, SIMULATED_FAILURE_MESSAGE};
use super::progress::SimulationSource;
use super::provider::{default_providers, CloudProvider};
use super::schedule::{Frequency, ScheduledExport};
use super::share::ShareableLink;
use super::template::{find_template, templates, ExportTemplate};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

/// Upper bound on ticks before a job is declared stalled
const MAX_TICKS: usize = 1_000;

/// Everything the simulation remembers between commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudState {
    #[serde(default)]
    pub jobs: Vec<ExportJob>,
    #[serde(default)]
    pub schedules: Vec<ScheduledExport>,
    #[serde(default)]
    pub links: Vec<ShareableLink>,
    #[serde(default = "default_providers")]
    pub providers: Vec<CloudProvider>,
}

impl Default for CloudState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            schedules: Vec::new(),
            links: Vec::new(),
            providers: default_providers(),
        }
    }
}

/// Simulated export, sharing and scheduling
pub struct CloudExportService<S: SimulationSource> {
    state: CloudState,
    source: S,
}

impl<S: SimulationSource> CloudExportService<S> {
    pub fn new(state: CloudState, source: S) -> Self {
        Self { state, source }
    }

    pub fn state(&self) -> &CloudState {
        &self.state
    }

    /// Hand the state back for persisting
    pub fn into_state(self) -> CloudState {
        self.state
    }

    pub fn templates(&self) -> &'static [ExportTemplate] {
        templates()
    }

    /// Payload a template would deliver for these expenses
    pub fn template_data(
        &self,
        expenses: &[Expense],
        template_id: &str,
        today: NaiveDate,
    ) -> ExpenseResult<Value> {
        let template =
            find_template(template_id).ok_or_else(|| ExpenseError::template_not_found(template_id))?;
        Ok(template.build_payload(expenses, today))
    }

    pub fn providers(&self) -> &[CloudProvider] {
        &self.state.providers
    }

    fn provider_mut(&mut self, provider_id: &str) -> ExpenseResult<&mut CloudProvider> {
        self.state
            .providers
            .iter_mut()
            .find(|p| p.id.eq_ignore_ascii_case(provider_id.trim()))
            .ok_or_else(|| ExpenseError::provider_not_found(provider_id))
    }

    /// Attempt a simulated OAuth connection; `Ok(false)` means it was declined
    pub fn connect_provider(&mut self, provider_id: &str) -> ExpenseResult<bool> {
        let delay = self.source.tick_delay();
        let succeeded = self.source.connect_succeeds();
        let provider = self.provider_mut(provider_id)?;

        pause(delay);
        if succeeded {
            provider.connect(Utc::now());
            info!(provider = %provider.id, "provider connected");
        } else {
            warn!(provider = %provider.id, "provider connection declined");
        }
        Ok(succeeded)
    }

    pub fn disconnect_provider(&mut self, provider_id: &str) -> ExpenseResult<()> {
        let provider = self.provider_mut(provider_id)?;
        provider.disconnect();
        info!(provider = %provider.id, "provider disconnected");
        Ok(())
    }

    fn check_destination(
        &self,
        destination: CloudDestination,
        recipient: Option<&str>,
    ) -> ExpenseResult<()> {
        if destination == CloudDestination::Email {
            match recipient.map(str::trim) {
                Some(address) if address.contains('@') => {}
                _ => {
                    return Err(ExpenseError::Validation(
                        "A valid recipient email address is required".into(),
                    ))
                }
            }
        }

        if let Some(provider_id) = destination.provider_id() {
            let connected = self
                .state
                .providers
                .iter()
                .any(|p| p.id == provider_id && p.connected);
            if !connected {
                return Err(ExpenseError::Cloud(format!(
                    "Provider '{}' is not connected",
                    provider_id
                )));
            }
        }

        Ok(())
    }

    /// Run one simulated export to completion
    ///
    /// `on_progress` sees the job after every tick. A failed job is returned
    /// as `Ok` with status `failed`; `Err` means the export never started.
    pub fn run_export<F>(
        &mut self,
        expenses: &[Expense],
        template_id: &str,
        destination: CloudDestination,
        recipient: Option<&str>,
        mut on_progress: F,
    ) -> ExpenseResult<ExportJob>
    where
        F: FnMut(&ExportJob),
    {
        let template =
            find_template(template_id).ok_or_else(|| ExpenseError::template_not_found(template_id))?;
        self.check_destination(destination, recipient)?;

        let mut job = ExportJob::new(template.id, destination, expenses, Utc::now());
        job.recipient = recipient.map(|r| r.trim().to_string());
        debug!(job = %job.id, template = template.id, %destination, "export job created");

        let doomed = self.source.job_fails();
        let mut ticks = 0;
        while !job.is_finished() {
            pause(self.source.tick_delay());
            if doomed && ticks > 0 {
                job.fail(SIMULATED_FAILURE_MESSAGE);
            } else if ticks >= MAX_TICKS {
                job.fail("Export stalled without progress");
            } else {
                let increment = self.source.progress_increment();
                job.advance(increment, Utc::now());
            }
            ticks += 1;
            on_progress(&job);
        }

        if destination == CloudDestination::LinkShare && job.share_url.is_none() {
            if let Some(completed_at) = job.completed_at {
                let link = ShareableLink::new(completed_at);
                job.share_url = Some(link.url.clone());
                self.state.links.push(link);
            }
        }

        info!(job = %job.id, status = %job.status, records = job.record_count, "export job finished");
        self.state.jobs.push(job.clone());
        Ok(job)
    }

    pub fn send_email<F: FnMut(&ExportJob)>(
        &mut self,
        expenses: &[Expense],
        template_id: &str,
        recipient: &str,
        on_progress: F,
    ) -> ExpenseResult<ExportJob> {
        self.run_export(
            expenses,
            template_id,
            CloudDestination::Email,
            Some(recipient),
            on_progress,
        )
    }

    pub fn export_to_google_sheets<F: FnMut(&ExportJob)>(
        &mut self,
        expenses: &[Expense],
        template_id: &str,
        on_progress: F,
    ) -> ExpenseResult<ExportJob> {
        self.run_export(
            expenses,
            template_id,
            CloudDestination::GoogleSheets,
            None,
            on_progress,
        )
    }

    pub fn create_shareable_link<F: FnMut(&ExportJob)>(
        &mut self,
        expenses: &[Expense],
        template_id: &str,
        on_progress: F,
    ) -> ExpenseResult<ExportJob> {
        self.run_export(
            expenses,
            template_id,
            CloudDestination::LinkShare,
            None,
            on_progress,
        )
    }

    /// Register a recurring export
    pub fn schedule_export(
        &mut self,
        template_id: &str,
        frequency: Frequency,
        cloud_provider: &str,
        recipient: Option<String>,
        now: DateTime<Utc>,
    ) -> ExpenseResult<ScheduledExport> {
        let template =
            find_template(template_id).ok_or_else(|| ExpenseError::template_not_found(template_id))?;

        let destination = match CloudDestination::from_provider(cloud_provider) {
            Some(CloudDestination::LinkShare) | None => {
                return Err(ExpenseError::Validation(format!(
                    "'{}' cannot receive scheduled exports",
                    cloud_provider
                )))
            }
            Some(destination) => destination,
        };

        if destination == CloudDestination::Email
            && !recipient.as_deref().is_some_and(|r| r.contains('@'))
        {
            return Err(ExpenseError::Validation(
                "Scheduled email exports need a recipient address".into(),
            ));
        }

        let schedule = ScheduledExport::new(
            template.id,
            frequency,
            destination.as_str(),
            recipient,
            now,
        );
        info!(schedule = %schedule.id, %frequency, next_run = %schedule.next_run, "export scheduled");
        self.state.schedules.push(schedule.clone());
        Ok(schedule)
    }

    pub fn scheduled_exports(&self) -> &[ScheduledExport] {
        &self.state.schedules
    }

    fn find_schedule_index(&self, identifier: &str) -> ExpenseResult<usize> {
        let matches: Vec<usize> = self
            .state
            .schedules
            .iter()
            .enumerate()
            .filter(|(_, s)| s.id.matches_identifier(identifier))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(ExpenseError::schedule_not_found(identifier)),
            _ => Err(ExpenseError::Validation(format!(
                "'{}' matches more than one schedule",
                identifier
            ))),
        }
    }

    /// Flip a schedule's enabled flag; returns the new value
    pub fn toggle_schedule(&mut self, identifier: &str) -> ExpenseResult<bool> {
        let index = self.find_schedule_index(identifier)?;
        let schedule = &mut self.state.schedules[index];
        schedule.enabled = !schedule.enabled;
        debug!(schedule = %schedule.id, enabled = schedule.enabled, "schedule toggled");
        Ok(schedule.enabled)
    }

    /// Execute every enabled schedule whose next run is at or before `now`
    ///
    /// Each due schedule advances to its next run even when its export could
    /// not start (for example a disconnected provider).
    pub fn run_due_schedules<F>(
        &mut self,
        expenses: &[Expense],
        now: DateTime<Utc>,
        mut on_progress: F,
    ) -> Vec<ExportJob>
    where
        F: FnMut(&ExportJob),
    {
        let due: Vec<usize> = self
            .state
            .schedules
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_due(now))
            .map(|(i, _)| i)
            .collect();

        let mut jobs = Vec::new();
        for index in due {
            let schedule = self.state.schedules[index].clone();
            let result = match schedule.destination() {
                Some(destination) => self.run_export(
                    expenses,
                    &schedule.template_id,
                    destination,
                    schedule.recipient.as_deref(),
                    &mut on_progress,
                ),
                None => Err(ExpenseError::Validation(format!(
                    "Unknown destination '{}'",
                    schedule.cloud_provider
                ))),
            };

            match result {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(schedule = %schedule.id, error = %e, "scheduled export skipped"),
            }
            self.state.schedules[index].mark_run(now);
        }

        jobs
    }

    /// All jobs, newest first
    pub fn history(&self) -> Vec<&ExportJob> {
        let mut jobs: Vec<&ExportJob> = self.state.jobs.iter().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn share_links(&self) -> &[ShareableLink] {
        &self.state.links
    }

    fn link_index(&self, identifier: &str) -> ExpenseResult<usize> {
        let matches: Vec<usize> = self
            .state
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.id.matches_identifier(identifier) || l.url == identifier.trim())
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(ExpenseError::link_not_found(identifier)),
            _ => Err(ExpenseError::Validation(format!(
                "'{}' matches more than one link",
                identifier
            ))),
        }
    }

    /// Cap how many times a link may be opened
    pub fn limit_link_access(&mut self, identifier: &str, max_access: u32) -> ExpenseResult<()> {
        if max_access == 0 {
            return Err(ExpenseError::Validation("Access limit must be at least 1".into()));
        }
        let index = self.link_index(identifier)?;
        self.state.links[index].max_access = Some(max_access);
        Ok(())
    }

    /// Open a link as a recipient would, counting the access
    pub fn open_link(
        &mut self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> ExpenseResult<ShareableLink> {
        let index = self.link_index(identifier)?;
        let link = &mut self.state.links[index];
        if !link.record_access(now) {
            return Err(ExpenseError::Validation(format!(
                "Link {} is expired or has reached its access limit",
                link.id
            )));
        }
        debug!(link = %link.id, accesses = link.access_count, "shareable link opened");
        Ok(link.clone())
    }

    /// Remove a shareable link
    pub fn revoke_link(&mut self, identifier: &str) -> ExpenseResult<ShareableLink> {
        let index = self.link_index(identifier)?;
        let link = self.state.links.remove(index);
        info!(link = %link.id, "shareable link revoked");
        Ok(link)
    }
}

fn pause(delay: std::time::Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::job::JobStatus;
    use crate::cloud::progress::ScriptedSource;
    use crate::models::{ExpenseCategory, Money};
    use chrono::{Duration, TimeZone};

    fn expenses() -> Vec<Expense> {
        vec![
            Expense::new(
                Money::from_cents(1250),
                ExpenseCategory::Food,
                "Coffee and pastry",
                NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            ),
            Expense::new(
                Money::from_cents(12000),
                ExpenseCategory::Bills,
                "Electric bill",
                NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
            ),
        ]
    }

    fn service(source: ScriptedSource) -> CloudExportService<ScriptedSource> {
        CloudExportService::new(CloudState::default(), source)
    }

    #[test]
    fn test_email_export_completes() {
        let mut service = service(ScriptedSource::new().with_increments([30.0, 30.0, 30.0, 30.0]));
        let mut seen = Vec::new();

        let job = service
            .send_email(&expenses(), "tax-report", "cpa@example.com", |job| {
                seen.push((job.status, job.progress))
            })
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100.0);
        assert_eq!(job.record_count, 2);
        assert_eq!(job.total_amount.cents(), 13250);
        assert_eq!(job.recipient.as_deref(), Some("cpa@example.com"));
        assert_eq!(seen.len(), 4);
        assert!(seen[..3].iter().all(|(s, _)| *s == JobStatus::Processing));
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn test_email_requires_address() {
        let mut service = service(ScriptedSource::new());
        let err = service
            .send_email(&expenses(), "tax-report", "not-an-address", |_| {})
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service.history().is_empty());
    }

    #[test]
    fn test_unknown_template() {
        let mut service = service(ScriptedSource::new());
        let err = service
            .create_shareable_link(&expenses(), "nope", |_| {})
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_sheets_requires_connected_provider() {
        let mut service = service(ScriptedSource::new().with_connects([false, true]));

        let err = service
            .export_to_google_sheets(&expenses(), "monthly-summary", |_| {})
            .unwrap_err();
        assert!(matches!(err, ExpenseError::Cloud(_)));

        assert!(!service.connect_provider("google-sheets").unwrap());
        assert!(service.connect_provider("google-sheets").unwrap());

        let job = service
            .export_to_google_sheets(&expenses(), "monthly-summary", |_| {})
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.cloud_provider.as_deref(), Some("google-sheets"));

        service.disconnect_provider("google-sheets").unwrap();
        assert!(service
            .export_to_google_sheets(&expenses(), "monthly-summary", |_| {})
            .is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let mut service = service(ScriptedSource::new());
        assert!(service.connect_provider("myspace").unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_job_is_recorded() {
        let mut service = service(ScriptedSource::new().with_failures([true]));
        let job = service
            .send_email(&expenses(), "tax-report", "me@example.com", |_| {})
            .unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some(SIMULATED_FAILURE_MESSAGE));
        assert!(job.completed_at.is_none());
        assert_eq!(service.history()[0].status, JobStatus::Failed);
    }

    #[test]
    fn test_link_share_creates_link() {
        let mut service = service(ScriptedSource::new().with_increments([100.0]));
        let job = service
            .create_shareable_link(&expenses(), "receipt-backup", |_| {})
            .unwrap();

        assert_eq!(job.status, JobStatus::Shared);
        let links = service.share_links();
        assert_eq!(links.len(), 1);
        assert_eq!(job.share_url.as_deref(), Some(links[0].url.as_str()));

        let short = links[0].id.to_string();
        service.revoke_link(&short).unwrap();
        assert!(service.share_links().is_empty());
        assert!(service.revoke_link(&short).unwrap_err().is_not_found());
    }

    #[test]
    fn test_open_link_counts_until_limit() {
        let mut service = service(ScriptedSource::new().with_increments([100.0]));
        let job = service
            .create_shareable_link(&expenses(), "receipt-backup", |_| {})
            .unwrap();
        let url = job.share_url.unwrap();
        let now = service.share_links()[0].created_at;

        assert!(service.limit_link_access(&url, 0).unwrap_err().is_validation());
        service.limit_link_access(&url, 2).unwrap();

        assert_eq!(service.open_link(&url, now).unwrap().access_count, 1);
        assert_eq!(service.open_link(&url, now).unwrap().access_count, 2);
        assert!(service.open_link(&url, now).unwrap_err().is_validation());
        assert_eq!(service.share_links()[0].access_count, 2);

        assert!(service.open_link("lnk-nope", now).unwrap_err().is_not_found());
    }

    #[test]
    fn test_expired_link_cannot_be_opened() {
        let mut service = service(ScriptedSource::new().with_increments([100.0]));
        service
            .create_shareable_link(&expenses(), "receipt-backup", |_| {})
            .unwrap();
        let link = service.share_links()[0].clone();

        let later = link.expires_at + chrono::Duration::seconds(1);
        assert!(service
            .open_link(&link.id.to_string(), later)
            .unwrap_err()
            .is_validation());
        assert_eq!(service.share_links()[0].access_count, 0);
    }

    #[test]
    fn test_history_newest_first() {
        let mut service = service(ScriptedSource::new());
        for _ in 0..3 {
            service
                .send_email(&expenses(), "tax-report", "me@example.com", |_| {})
                .unwrap();
        }
        let history = service.history();
        assert!(history
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_schedules() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        let mut service = service(ScriptedSource::new());

        let weekly = service
            .schedule_export(
                "monthly-summary",
                Frequency::Weekly,
                "email",
                Some("me@example.com".into()),
                now,
            )
            .unwrap();
        assert_eq!(weekly.next_run, now + Duration::weeks(1));

        assert!(service
            .schedule_export("monthly-summary", Frequency::Daily, "email", None, now)
            .unwrap_err()
            .is_validation());
        assert!(service
            .schedule_export("monthly-summary", Frequency::Daily, "notion", None, now)
            .unwrap_err()
            .is_validation());

        // Dropbox is disconnected: the run is skipped but the schedule advances
        let dropbox = service
            .schedule_export("receipt-backup", Frequency::Daily, "dropbox", None, now)
            .unwrap();

        let later = now + Duration::days(8);
        let jobs = service.run_due_schedules(&expenses(), later, |_| {});
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].template_id, "monthly-summary");
        assert!(service
            .scheduled_exports()
            .iter()
            .all(|s| s.last_run == Some(later) && s.next_run > later));

        assert!(!service.toggle_schedule(&dropbox.id.to_string()).unwrap());
        let jobs = service.run_due_schedules(&expenses(), later + Duration::days(30), |_| {});
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut service = service(ScriptedSource::new().with_increments([100.0]));
        service
            .create_shareable_link(&expenses(), "personal-budget", |_| {})
            .unwrap();

        let json = serde_json::to_string(service.state()).unwrap();
        let restored: CloudState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.jobs, service.state().jobs);
        assert_eq!(restored.links, service.state().links);
        assert_eq!(restored.providers.len(), 5);
    }

    #[test]
    fn test_template_data() {
        let service = service(ScriptedSource::new());
        let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let payload = service
            .template_data(&expenses(), "personal-budget", today)
            .unwrap();
        assert_eq!(payload["summary"]["count"], 2);
        assert!(service.template_data(&[], "nope", today).is_err());
    }
}
