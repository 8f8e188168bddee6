//! Share repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_entity::share::ItemShare;

/// Repository for root shares.
#[derive(Debug)]
pub struct ShareRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ShareRepository<'c> {
    /// Create a repository over a borrowed connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find the share for an item and target user.
    pub async fn find(&mut self, item_id: Uuid, target_user_id: Uuid) -> AppResult<Option<ItemShare>> {
        sqlx::query_as::<_, ItemShare>(
            "SELECT * FROM item_share WHERE item_id = $1 AND target_user_id = $2",
        )
        .bind(item_id)
        .bind(target_user_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    /// Insert a share or overwrite the role of the existing one.
    pub async fn upsert(&mut self, share: &ItemShare) -> AppResult<ItemShare> {
        sqlx::query_as::<_, ItemShare>(
            "INSERT INTO item_share (item_id, target_user_id, role, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (item_id, target_user_id) DO UPDATE SET role = EXCLUDED.role \
             RETURNING *",
        )
        .bind(share.item_id)
        .bind(share.target_user_id)
        .bind(share.role)
        .bind(share.created_at)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert share", e))
    }

    /// Shares granted to a user, oldest first.
    pub async fn find_by_target(&mut self, target_user_id: Uuid) -> AppResult<Vec<ItemShare>> {
        sqlx::query_as::<_, ItemShare>(
            "SELECT * FROM item_share WHERE target_user_id = $1 ORDER BY created_at ASC",
        )
        .bind(target_user_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))
    }
}
