//! Simulated cloud storage providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A storage provider the user can "connect"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProvider {
    pub id: String,
    pub name: String,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_backup: bool,
}

impl CloudProvider {
    fn disconnected(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            connected: false,
            last_sync: None,
            auto_backup: false,
        }
    }

    pub fn connect(&mut self, now: DateTime<Utc>) {
        self.connected = true;
        self.last_sync = Some(now);
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.auto_backup = false;
    }
}

/// The built-in provider list, every entry disconnected
pub fn default_providers() -> Vec<CloudProvider> {
    vec![
        CloudProvider::disconnected("google-drive", "Google Drive"),
        CloudProvider::disconnected("dropbox", "Dropbox"),
        CloudProvider::disconnected("onedrive", "OneDrive"),
        CloudProvider::disconnected("google-sheets", "Google Sheets"),
        CloudProvider::disconnected("notion", "Notion"),
    ]
}
