//! Recurring export schedules
//!
//! Nothing runs in the background: due schedules are executed when the user
//! asks for it (`expenses cloud run-due`).

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::job::CloudDestination;
use crate::models::ScheduleId;

/// How often a scheduled export repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// The run following one at `from`
    ///
    /// Month arithmetic clamps to the end of shorter months
    /// (Jan 31 + 1 month = Feb 28/29).
    pub fn next_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Daily => from + Duration::days(1),
            Self::Weekly => from + Duration::weeks(1),
            Self::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or(from + Duration::days(30)),
            Self::Quarterly => from
                .checked_add_months(Months::new(3))
                .unwrap_or(from + Duration::days(91)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledExport {
    pub id: ScheduleId,
    pub template_id: String,
    pub frequency: Frequency,
    pub next_run: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    pub enabled: bool,
    pub cloud_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl ScheduledExport {
    /// Create an enabled schedule whose first run is one period from `now`
    pub fn new(
        template_id: impl Into<String>,
        frequency: Frequency,
        cloud_provider: impl Into<String>,
        recipient: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ScheduleId::new(),
            template_id: template_id.into(),
            frequency,
            next_run: frequency.next_after(now),
            last_run: None,
            enabled: true,
            cloud_provider: cloud_provider.into(),
            recipient,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.next_run <= now
    }

    /// Record a run at `now` and move `next_run` forward
    pub fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
        self.next_run = self.frequency.next_after(now);
    }

    pub fn destination(&self) -> Option<CloudDestination> {
        CloudDestination::from_provider(&self.cloud_provider)
    }
}
