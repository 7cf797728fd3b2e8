//! The singleton operator account.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::PasswordHash;

/// The single operator permitted to mutate transports and phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Build a new account record.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: PasswordHash, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Authentication state reported to the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
    pub authenticated: bool,
    pub needs_setup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
