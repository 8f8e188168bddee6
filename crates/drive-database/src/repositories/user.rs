//! User repository implementation.

use sqlx::PgConnection;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_entity::user::AppUser;

/// Repository for the external identity mapping.
#[derive(Debug)]
pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    /// Create a repository over a borrowed connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find a user by external identity.
    pub async fn find_by_external_id(&mut self, external_identity_id: &str) -> AppResult<Option<AppUser>> {
        sqlx::query_as::<_, AppUser>("SELECT * FROM app_user WHERE external_identity_id = $1")
            .bind(external_identity_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by identity", e)
            })
    }

    /// Insert a user unless the external identity already exists, returning the stored row.
    pub async fn upsert(&mut self, user: &AppUser) -> AppResult<AppUser> {
        sqlx::query_as::<_, AppUser>(
            "INSERT INTO app_user (id, external_identity_id, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (external_identity_id) \
             DO UPDATE SET external_identity_id = EXCLUDED.external_identity_id \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.external_identity_id)
        .bind(user.created_at)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))
    }
}
