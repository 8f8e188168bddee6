//! PostgreSQL unit-of-work store: one `sqlx` transaction per unit of work.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_entity::item::Item;
use drive_entity::share::ItemShare;
use drive_entity::user::AppUser;

use crate::repositories::{ItemRepository, ShareRepository, UserRepository};
use crate::store::{DriveStore, ItemStore, ShareStore, UnitOfWork, UserStore};

/// [`DriveStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveStore for PgStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A unit of work wrapping one open transaction.
#[derive(Debug)]
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ItemStore for PgUnitOfWork {
    async fn find_item(&mut self, id: Uuid) -> AppResult<Option<Item>> {
        ItemRepository::new(&mut *self.tx).find_by_id(id).await
    }

    async fn list_root_items(&mut self, owner_id: Uuid) -> AppResult<Vec<Item>> {
        ItemRepository::new(&mut *self.tx)
            .find_roots_by_owner(owner_id)
            .await
    }

    async fn list_children(&mut self, parent_id: Uuid) -> AppResult<Vec<Item>> {
        ItemRepository::new(&mut *self.tx)
            .find_children(parent_id)
            .await
    }

    async fn search_by_name(&mut self, query: &str, limit: usize) -> AppResult<Vec<Item>> {
        ItemRepository::new(&mut *self.tx)
            .search_by_name(query, limit)
            .await
    }

    async fn insert_item(&mut self, item: &Item) -> AppResult<()> {
        ItemRepository::new(&mut *self.tx).create(item).await
    }

    async fn update_item(&mut self, item: &Item) -> AppResult<()> {
        ItemRepository::new(&mut *self.tx).update(item).await
    }

    async fn delete_item(&mut self, id: Uuid) -> AppResult<bool> {
        ItemRepository::new(&mut *self.tx).delete(id).await
    }
}

#[async_trait]
impl ShareStore for PgUnitOfWork {
    async fn find_share(
        &mut self,
        item_id: Uuid,
        target_user_id: Uuid,
    ) -> AppResult<Option<ItemShare>> {
        ShareRepository::new(&mut *self.tx)
            .find(item_id, target_user_id)
            .await
    }

    async fn upsert_share(&mut self, share: &ItemShare) -> AppResult<ItemShare> {
        ShareRepository::new(&mut *self.tx).upsert(share).await
    }

    async fn list_shares_for_user(&mut self, target_user_id: Uuid) -> AppResult<Vec<ItemShare>> {
        ShareRepository::new(&mut *self.tx)
            .find_by_target(target_user_id)
            .await
    }
}

#[async_trait]
impl UserStore for PgUnitOfWork {
    async fn find_user_by_external_id(
        &mut self,
        external_identity_id: &str,
    ) -> AppResult<Option<AppUser>> {
        UserRepository::new(&mut *self.tx)
            .find_by_external_id(external_identity_id)
            .await
    }

    async fn upsert_user(&mut self, user: &AppUser) -> AppResult<AppUser> {
        UserRepository::new(&mut *self.tx).upsert(user).await
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to roll back", e))
    }
}
