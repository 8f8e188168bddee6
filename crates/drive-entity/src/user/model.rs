//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An internal user record mapped 1:1 to an external identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AppUser {
    /// Internal user identifier.
    pub id: Uuid,
    /// Identifier issued by the external identity provider. Unique.
    pub external_identity_id: String,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
}

impl AppUser {
    /// Build a new user for an external identity.
    pub fn new(external_identity_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_identity_id: external_identity_id.into(),
            created_at: Utc::now(),
        }
    }
}
