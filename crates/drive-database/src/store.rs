//! Unit-of-work store traits.
//!
//! A [`DriveStore`] hands out [`UnitOfWork`]s. Everything read or written
//! through one unit of work is atomic with respect to other units of work:
//! it becomes visible on [`UnitOfWork::commit`] and is discarded on
//! [`UnitOfWork::rollback`] or when the unit of work is dropped.

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use drive_core::result::AppResult;
use drive_entity::item::Item;
use drive_entity::share::ItemShare;
use drive_entity::user::AppUser;

/// Item tree access: point lookups, child listing, and name search.
#[async_trait]
pub trait ItemStore: Send {
    /// Find an item by ID.
    async fn find_item(&mut self, id: Uuid) -> AppResult<Option<Item>>;

    /// Roots owned by `owner_id`, in listing order.
    async fn list_root_items(&mut self, owner_id: Uuid) -> AppResult<Vec<Item>>;

    /// Direct children of `parent_id`, in listing order.
    async fn list_children(&mut self, parent_id: Uuid) -> AppResult<Vec<Item>>;

    /// Case-insensitive substring match on name, most recently updated first.
    async fn search_by_name(&mut self, query: &str, limit: usize) -> AppResult<Vec<Item>>;

    /// Insert a new item. The parent, if any, must exist.
    async fn insert_item(&mut self, item: &Item) -> AppResult<()>;

    /// Persist the mutable fields (`parent_id`, `name`, `updated_at`) of an item.
    async fn update_item(&mut self, item: &Item) -> AppResult<()>;

    /// Delete a single item. Fails while the item still has children.
    /// Returns `true` if a row was deleted.
    async fn delete_item(&mut self, id: Uuid) -> AppResult<bool>;
}

/// Root-share registry.
#[async_trait]
pub trait ShareStore: Send {
    /// Find the share for `(item_id, target_user_id)`.
    async fn find_share(
        &mut self,
        item_id: Uuid,
        target_user_id: Uuid,
    ) -> AppResult<Option<ItemShare>>;

    /// Insert a share, or overwrite the role of an existing one for the same pair.
    async fn upsert_share(&mut self, share: &ItemShare) -> AppResult<ItemShare>;

    /// All shares naming `target_user_id`, oldest first.
    async fn list_shares_for_user(&mut self, target_user_id: Uuid) -> AppResult<Vec<ItemShare>>;
}

/// Identity registry.
#[async_trait]
pub trait UserStore: Send {
    /// Find a user by external identity.
    async fn find_user_by_external_id(
        &mut self,
        external_identity_id: &str,
    ) -> AppResult<Option<AppUser>>;

    /// Insert `user` unless its external identity is already known; returns
    /// the stored row either way.
    async fn upsert_user(&mut self, user: &AppUser) -> AppResult<AppUser>;
}

/// One atomic unit of work over items, shares, and users.
#[async_trait]
pub trait UnitOfWork: ItemStore + ShareStore + UserStore {
    /// Make every write of this unit of work visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write of this unit of work.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Factory for units of work.
#[async_trait]
pub trait DriveStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "postgres", "memory").
    fn backend(&self) -> &str;

    /// Start a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise, and pass the
/// result through. A failed commit replaces the result; a failed rollback is
/// only logged so the original error reaches the caller.
pub async fn finish<T>(tx: Box<dyn UnitOfWork>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
