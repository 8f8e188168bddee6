//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role granted on a shared root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareRole {
    /// Read-only access to the whole tree.
    #[default]
    Viewer,
    /// Read-write access to the whole tree.
    Editor,
}

impl ShareRole {
    /// Whether this role permits mutation.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Editor)
    }

    /// Return the role as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "VIEWER",
            Self::Editor => "EDITOR",
        }
    }
}

impl std::fmt::Display for ShareRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShareRole {
    type Err = drive_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VIEWER" => Ok(Self::Viewer),
            "EDITOR" => Ok(Self::Editor),
            _ => Err(drive_core::AppError::bad_request(format!(
                "Invalid share role: '{s}'"
            ))),
        }
    }
}

/// A grant of `role` on root item `item_id` to `target_user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ItemShare {
    /// The shared root item.
    pub item_id: Uuid,
    /// The user receiving access.
    pub target_user_id: Uuid,
    /// Granted role.
    pub role: ShareRole,
    /// When the share was first created.
    pub created_at: DateTime<Utc>,
}

impl ItemShare {
    /// Build a new share row stamped with the current time.
    pub fn new(item_id: Uuid, target_user_id: Uuid, role: ShareRole) -> Self {
        Self {
            item_id,
            target_user_id,
            role,
            created_at: Utc::now(),
        }
    }
}
