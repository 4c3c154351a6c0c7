//! Shareable links produced by link-share exports

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ShareLinkId;

/// Base of every generated link; nothing is served there
pub const SHARE_BASE_URL: &str = "https://expense-tracker.app/shared/";

/// How long a link stays valid
pub const LINK_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareableLink {
    pub id: ShareLinkId,
    pub url: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub access_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_access: Option<u32>,
    #[serde(default)]
    pub password_protected: bool,
    pub created_at: DateTime<Utc>,
}

impl ShareableLink {
    pub fn new(now: DateTime<Utc>) -> Self {
        let id = ShareLinkId::new();
        Self {
            url: format!("{}{}", SHARE_BASE_URL, id.as_uuid()),
            id,
            expires_at: now + Duration::days(LINK_LIFETIME_DAYS),
            access_count: 0,
            max_access: None,
            password_protected: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Not expired and below the access cap, if any
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && self.max_access.map_or(true, |max| self.access_count < max)
    }

    /// Count one access; returns false if the link was unavailable
    pub fn record_access(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_available(now) {
            return false;
        }
        self.access_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_link() {
        let now = Utc::now();
        let link = ShareableLink::new(now);
        assert!(link.url.starts_with(SHARE_BASE_URL));
        assert!(link.url.ends_with(&link.id.as_uuid().to_string()));
        assert_eq!(link.expires_at - link.created_at, Duration::days(7));
        assert!(!link.is_expired(now));
        assert!(link.is_expired(now + Duration::days(7)));
    }

    #[test]
    fn test_access_cap() {
        let now = Utc::now();
        let mut link = ShareableLink::new(now);
        link.max_access = Some(2);

        assert!(link.record_access(now));
        assert!(link.record_access(now));
        assert!(!link.record_access(now));
        assert_eq!(link.access_count, 2);
    }

    #[test]
    fn test_expired_link_rejects_access() {
        let now = Utc::now();
        let mut link = ShareableLink::new(now);
        assert!(!link.record_access(now + Duration::days(8)));
        assert_eq!(link.access_count, 0);
    }
}
