//! Export job state machine
//!
//! ```text
//! pending ──advance──▶ processing ──progress ≥ 100──▶ completed | shared
//!    │                     │
//!    └────────fail─────────┴──────────▶ failed
//! ```
//!
//! Terminal states (`completed`, `shared`, `failed`) ignore further input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Expense, ExportJobId, Money};

/// Canned message attached to simulated failures
pub const SIMULATED_FAILURE_MESSAGE: &str =
    "Export failed: the provider rejected the upload (simulated)";

/// Where a simulated export is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloudDestination {
    Email,
    GoogleSheets,
    GoogleDrive,
    Dropbox,
    #[serde(rename = "onedrive")]
    OneDrive,
    LinkShare,
}

impl CloudDestination {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::GoogleSheets => "google-sheets",
            Self::GoogleDrive => "google-drive",
            Self::Dropbox => "dropbox",
            Self::OneDrive => "onedrive",
            Self::LinkShare => "link-share",
        }
    }

    /// The provider that must be connected before delivering here
    pub const fn provider_id(&self) -> Option<&'static str> {
        match self {
            Self::Email | Self::LinkShare => None,
            Self::GoogleSheets => Some("google-sheets"),
            Self::GoogleDrive => Some("google-drive"),
            Self::Dropbox => Some("dropbox"),
            Self::OneDrive => Some("onedrive"),
        }
    }

    /// Destination used by a schedule targeting `provider`
    pub fn from_provider(provider: &str) -> Option<Self> {
        provider.parse().ok()
    }
}

impl fmt::Display for CloudDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CloudDestination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "google-sheets" => Ok(Self::GoogleSheets),
            "google-drive" => Ok(Self::GoogleDrive),
            "dropbox" => Ok(Self::Dropbox),
            "onedrive" => Ok(Self::OneDrive),
            "link-share" => Ok(Self::LinkShare),
            other => Err(format!("Unknown destination '{}'", other)),
        }
    }
}

/// Lifecycle state of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Shared,
}

impl JobStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Shared)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Shared => "Shared",
        };
        f.pad(label)
    }
}

/// One simulated export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub id: ExportJobId,
    pub template_id: String,
    pub destination: CloudDestination,
    pub status: JobStatus,
    /// 0.0..=100.0
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub record_count: usize,
    pub total_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
}

impl ExportJob {
    /// Create a pending job covering `expenses`
    pub fn new(
        template_id: impl Into<String>,
        destination: CloudDestination,
        expenses: &[Expense],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExportJobId::new(),
            template_id: template_id.into(),
            destination,
            status: JobStatus::Pending,
            progress: 0.0,
            created_at: now,
            completed_at: None,
            record_count: expenses.len(),
            total_amount: expenses.iter().map(|e| e.amount).sum(),
            share_url: None,
            error_message: None,
            recipient: None,
            cloud_provider: destination.provider_id().map(str::to_string),
        }
    }

    /// Add progress; finishes the job once progress reaches 100
    pub fn advance(&mut self, increment: f64, now: DateTime<Utc>) -> JobStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        self.progress += increment.max(0.0);
        self.status = JobStatus::Processing;

        if self.progress >= 100.0 {
            self.progress = 100.0;
            self.status = if self.destination == CloudDestination::LinkShare {
                JobStatus::Shared
            } else {
                JobStatus::Completed
            };
            self.completed_at = Some(now);
        }

        self.status
    }

    /// Move the job to `failed`; no effect on a finished job
    pub fn fail(&mut self, message: impl Into<String>) -> JobStatus {
        if !self.status.is_terminal() {
            self.status = JobStatus::Failed;
            self.error_message = Some(message.into());
        }
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
