//! User fixtures for the API suite

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record as the service represents it on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// A fresh fixture with a unique id and current timestamps, scoped to
    /// one test case.
    pub fn fixture() -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The same record with a new name and a bumped updated timestamp.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ..self.clone()
        }
    }
}

/// An id guaranteed not to exist on the remote collection.
pub fn unused_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_get_unique_ids() {
        let a = User::fixture();
        let b = User::fixture();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Test User");
    }

    #[test]
    fn wire_format_is_camel_case() {
        let user = User::fixture();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn renamed_keeps_id_and_bumps_update_time() {
        let user = User::fixture();
        let updated = user.renamed("Updated Name");
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.created_at, user.created_at);
        assert_eq!(updated.name, "Updated Name");
    }

    #[test]
    fn round_trips_through_json() {
        let user = User::fixture();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
