//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix used by the short form
            pub const PREFIX: &'static str = $display_prefix;

            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Check whether a user-typed identifier refers to this ID
            ///
            /// Accepts the full UUID, the short display form, or a hex prefix
            /// (with or without the display prefix) of at least 4 characters.
            pub fn matches_identifier(&self, identifier: &str) -> bool {
                let identifier = identifier.trim().to_ascii_lowercase();
                let bare = identifier
                    .strip_prefix($display_prefix)
                    .unwrap_or(identifier.as_str());
                if bare.len() < 4 {
                    return false;
                }
                let full = self.0.to_string();
                full == bare || full.starts_with(bare)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ExpenseId, "exp-");
define_id!(ExportJobId, "job-");
define_id!(ScheduleId, "sch-");
define_id!(ShareLinkId, "lnk-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = ExpenseId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12); // "exp-" + 8 chars
    }

    #[test]
    fn test_id_equality() {
        let id1 = ExpenseId::new();
        let id2 = id1;
        assert_eq!(id1, id2);
        assert_ne!(id1, ExpenseId::new());
    }

    #[test]
    fn test_id_serialization_is_transparent() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = ExpenseId::parse(uuid_str).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid_str));

        let back: ExpenseId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_matches_identifier() {
        let id = ExpenseId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();

        assert!(id.matches_identifier("550e8400-e29b-41d4-a716-446655440000"));
        assert!(id.matches_identifier("exp-550e8400"));
        assert!(id.matches_identifier("550E84"));
        assert!(!id.matches_identifier("550"));
        assert!(!id.matches_identifier("exp-12345678"));
    }

    #[test]
    fn test_from_str_accepts_prefixed_uuid() {
        let id: ShareLinkId = "lnk-550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }
}
