//! Item repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_entity::item::Item;

/// Repository for item tree queries.
#[derive(Debug)]
pub struct ItemRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ItemRepository<'c> {
    /// Create a repository over a borrowed connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Find an item by ID.
    pub async fn find_by_id(&mut self, id: Uuid) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM item WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))
    }

    /// Roots owned by a user, folders first, then by name.
    pub async fn find_roots_by_owner(&mut self, owner_id: Uuid) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>(
            "SELECT * FROM item WHERE owner_id = $1 AND parent_id IS NULL \
             ORDER BY type ASC, name ASC, created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list root items", e))
    }

    /// Direct children of a folder, folders first, then by name.
    pub async fn find_children(&mut self, parent_id: Uuid) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>(
            "SELECT * FROM item WHERE parent_id = $1 \
             ORDER BY type ASC, name ASC, created_at ASC",
        )
        .bind(parent_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    /// Case-insensitive substring search on name, most recently updated first.
    pub async fn search_by_name(&mut self, query: &str, limit: usize) -> AppResult<Vec<Item>> {
        let pattern = format!("%{}%", escape_like(query));
        sqlx::query_as::<_, Item>(
            "SELECT * FROM item WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY updated_at DESC LIMIT $2",
        )
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search items", e))
    }

    /// Insert a new item.
    pub async fn create(&mut self, item: &Item) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO item (id, owner_id, parent_id, type, name, mime_type, size_bytes, \
             blob_key, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(item.parent_id)
        .bind(item.item_type)
        .bind(&item.name)
        .bind(&item.mime_type)
        .bind(item.size_bytes)
        .bind(&item.blob_key)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                AppError::with_source(ErrorKind::BadRequest, "Item already exists", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create item", e)
            }
        })?;
        Ok(())
    }

    /// Persist parent, name, and update time.
    pub async fn update(&mut self, item: &Item) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE item SET parent_id = $2, name = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(item.id)
        .bind(item.parent_id)
        .bind(&item.name)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update item", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Item {} not found", item.id)));
        }
        Ok(())
    }

    /// Delete a single item. Returns `true` if a row was removed.
    pub async fn delete(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM item WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete item", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `ILIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
