//! User settings for the expense tracker
//!
//! Manages user preferences: currency display, export defaults and the
//! knobs of the cloud export simulation.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::TrackerPaths;
use crate::error::ExpenseError;
use crate::export::ExportFormat;

/// Defaults applied by `expenses export` when flags are omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Format used when none is given
    #[serde(default)]
    pub default_format: ExportFormat,

    /// Pretty-print JSON exports
    #[serde(default = "default_true")]
    pub pretty_json: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::default(),
            pretty_json: true,
        }
    }
}

/// Tuning for the simulated cloud export service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Probability (0.0..=1.0) that an export job fails
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// Probability (0.0..=1.0) that connecting a provider succeeds
    #[serde(default = "default_connect_success_rate")]
    pub connect_success_rate: f64,

    /// Sleep between progress ticks like a real upload would
    #[serde(default = "default_true")]
    pub realtime: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            connect_success_rate: default_connect_success_rate(),
            realtime: true,
        }
    }
}

/// User settings for the expense tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Export defaults
    #[serde(default)]
    pub export: ExportSettings,

    /// Cloud export simulation settings
    #[serde(default)]
    pub simulation: SimulationSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_failure_rate() -> f64 {
    0.05
}

fn default_connect_success_rate() -> f64 {
    0.8
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            export: ExportSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TrackerPaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ExpenseError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ExpenseError::Config(format!("Failed to parse settings file: {}", e)))?;
        validate_date_format(&settings.date_format)?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> Result<(), ExpenseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ExpenseError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ExpenseError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

/// Reject strftime patterns chrono cannot render
pub fn validate_date_format(format: &str) -> Result<(), ExpenseError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ExpenseError::Config(format!(
            "Invalid date_format '{}'",
            format
        )));
    }
    Ok(())
}
