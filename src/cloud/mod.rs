//! Simulated cloud export, sharing and automation
//!
//! Nothing in this module touches a network. Jobs animate a progress value,
//! providers flip a `connected` flag and share links point at a URL nobody
//! serves. Randomness and delays come from a [`SimulationSource`] so tests
//! can script every outcome.

pub mod job;
pub mod progress;
pub mod provider;
pub mod schedule;
pub mod service;
pub mod share;
pub mod template;

pub use job::{CloudDestination, ExportJob, JobStatus, SIMULATED_FAILURE_MESSAGE};
pub use progress::{RandomSource, ScriptedSource, SimulationSource};
pub use provider::{default_providers, CloudProvider};
pub use schedule::{Frequency, ScheduledExport};
pub use service::{CloudExportService, CloudState};
pub use share::{ShareableLink, LINK_LIFETIME_DAYS, SHARE_BASE_URL};
pub use template::{find_template, templates, ExportTemplate, TEMPLATES};
