//! In-memory unit-of-work store.
//!
//! Items live in an arena keyed by ID with a secondary parent → children
//! index. Units of work are serialized behind an async mutex: `begin` takes
//! the lock and clones the state into a private working copy, `commit`
//! writes the copy back, and dropping the unit of work without committing
//! discards it. Foreign keys are enforced the way the PostgreSQL schema
//! enforces them (parent must exist, a parent with children cannot be
//! deleted, shares go away with their item).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_entity::item::Item;
use drive_entity::share::ItemShare;
use drive_entity::user::AppUser;

use crate::store::{DriveStore, ItemStore, ShareStore, UnitOfWork, UserStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    items: HashMap<Uuid, Item>,
    children: HashMap<Uuid, HashSet<Uuid>>,
    users: HashMap<Uuid, AppUser>,
    users_by_external_id: HashMap<String, Uuid>,
    shares: HashMap<(Uuid, Uuid), ItemShare>,
}

impl MemoryState {
    fn sorted(&self, ids: impl Iterator<Item = Uuid>) -> Vec<Item> {
        let mut items: Vec<Item> = ids.filter_map(|id| self.items.get(&id).cloned()).collect();
        items.sort_by(Item::listing_cmp);
        items
    }

    fn require_parent(&self, parent_id: Option<Uuid>) -> AppResult<()> {
        match parent_id {
            Some(pid) if !self.items.contains_key(&pid) => Err(AppError::database(format!(
                "Foreign key violation: parent {pid} does not exist"
            ))),
            _ => Ok(()),
        }
    }

    fn link(&mut self, parent_id: Option<Uuid>, child_id: Uuid) {
        if let Some(pid) = parent_id {
            self.children.entry(pid).or_default().insert(child_id);
        }
    }

    fn unlink(&mut self, parent_id: Option<Uuid>, child_id: Uuid) {
        if let Some(pid) = parent_id {
            if let Some(set) = self.children.get_mut(&pid) {
                set.remove(&child_id);
                if set.is_empty() {
                    self.children.remove(&pid);
                }
            }
        }
    }
}

/// In-memory [`DriveStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed items.
    pub async fn item_count(&self) -> usize {
        self.state.lock().await.items.len()
    }
}

#[async_trait]
impl DriveStore for MemoryStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

/// A unit of work over a private copy of the [`MemoryStore`] state.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl ItemStore for MemoryUnitOfWork {
    async fn find_item(&mut self, id: Uuid) -> AppResult<Option<Item>> {
        Ok(self.working.items.get(&id).cloned())
    }

    async fn list_root_items(&mut self, owner_id: Uuid) -> AppResult<Vec<Item>> {
        let ids = self
            .working
            .items
            .values()
            .filter(|item| item.is_root() && item.owner_id == owner_id)
            .map(|item| item.id);
        Ok(self.working.sorted(ids))
    }

    async fn list_children(&mut self, parent_id: Uuid) -> AppResult<Vec<Item>> {
        let ids = self
            .working
            .children
            .get(&parent_id)
            .into_iter()
            .flatten()
            .copied();
        Ok(self.working.sorted(ids))
    }

    async fn search_by_name(&mut self, query: &str, limit: usize) -> AppResult<Vec<Item>> {
        let needle = query.to_lowercase();
        let mut hits: Vec<Item> = self
            .working
            .items
            .values()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn insert_item(&mut self, item: &Item) -> AppResult<()> {
        if self.working.items.contains_key(&item.id) {
            return Err(AppError::database(format!("Duplicate item id {}", item.id)));
        }
        self.working.require_parent(item.parent_id)?;
        self.working.link(item.parent_id, item.id);
        self.working.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_item(&mut self, item: &Item) -> AppResult<()> {
        let previous_parent = match self.working.items.get(&item.id) {
            Some(existing) => existing.parent_id,
            None => return Err(AppError::not_found(format!("Item {} not found", item.id))),
        };
        self.working.require_parent(item.parent_id)?;

        let stored = self
            .working
            .items
            .get_mut(&item.id)
            .ok_or_else(|| AppError::not_found(format!("Item {} not found", item.id)))?;
        stored.parent_id = item.parent_id;
        stored.name = item.name.clone();
        stored.updated_at = item.updated_at;

        if previous_parent != item.parent_id {
            self.working.unlink(previous_parent, item.id);
            self.working.link(item.parent_id, item.id);
        }
        Ok(())
    }

    async fn delete_item(&mut self, id: Uuid) -> AppResult<bool> {
        if self.working.children.contains_key(&id) {
            return Err(AppError::database(format!(
                "Foreign key violation: item {id} still has children"
            )));
        }
        let Some(removed) = self.working.items.remove(&id) else {
            return Ok(false);
        };
        self.working.unlink(removed.parent_id, id);
        self.working.shares.retain(|(item_id, _), _| *item_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ShareStore for MemoryUnitOfWork {
    async fn find_share(
        &mut self,
        item_id: Uuid,
        target_user_id: Uuid,
    ) -> AppResult<Option<ItemShare>> {
        Ok(self.working.shares.get(&(item_id, target_user_id)).cloned())
    }

    async fn upsert_share(&mut self, share: &ItemShare) -> AppResult<ItemShare> {
        if !self.working.items.contains_key(&share.item_id) {
            return Err(AppError::database(format!(
                "Foreign key violation: item {} does not exist",
                share.item_id
            )));
        }
        let stored = self
            .working
            .shares
            .entry((share.item_id, share.target_user_id))
            .and_modify(|existing| existing.role = share.role)
            .or_insert_with(|| share.clone());
        Ok(stored.clone())
    }

    async fn list_shares_for_user(&mut self, target_user_id: Uuid) -> AppResult<Vec<ItemShare>> {
        let mut shares: Vec<ItemShare> = self
            .working
            .shares
            .values()
            .filter(|share| share.target_user_id == target_user_id)
            .cloned()
            .collect();
        shares.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(shares)
    }
}

#[async_trait]
impl UserStore for MemoryUnitOfWork {
    async fn find_user_by_external_id(
        &mut self,
        external_identity_id: &str,
    ) -> AppResult<Option<AppUser>> {
        Ok(self
            .working
            .users_by_external_id
            .get(external_identity_id)
            .and_then(|id| self.working.users.get(id))
            .cloned())
    }

    async fn upsert_user(&mut self, user: &AppUser) -> AppResult<AppUser> {
        if let Some(existing) = self
            .working
            .users_by_external_id
            .get(&user.external_identity_id)
            .and_then(|id| self.working.users.get(id))
        {
            return Ok(existing.clone());
        }
        self.working
            .users_by_external_id
            .insert(user.external_identity_id.clone(), user.id);
        self.working.users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        debug!("Committed in-memory unit of work");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!("Rolled back in-memory unit of work");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let store = MemoryStore::new();
        let folder = Item::new_folder(Uuid::new_v4(), None, "docs");

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&folder).await.unwrap();
        drop(tx);
        assert_eq!(store.item_count().await, 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&folder).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(store.item_count().await, 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&folder).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_parent_must_exist() {
        let store = MemoryStore::new();
        let orphan = Item::new_folder(Uuid::new_v4(), Some(Uuid::new_v4()), "orphan");
        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_item(&orphan).await.is_err());
    }

    #[tokio::test]
    async fn test_parent_with_children_cannot_be_deleted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let parent = Item::new_folder(owner, None, "parent");
        let child = Item::new_folder(owner, Some(parent.id), "child");

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&parent).await.unwrap();
        tx.insert_item(&child).await.unwrap();
        assert!(tx.delete_item(parent.id).await.is_err());
        assert!(tx.delete_item(child.id).await.unwrap());
        assert!(tx.delete_item(parent.id).await.unwrap());
        assert!(!tx.delete_item(parent.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_moves_child_index() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let a = Item::new_folder(owner, None, "a");
        let b = Item::new_folder(owner, None, "b");
        let mut doc = Item::new_file(owner, Some(a.id), "doc", None, 1);

        let mut tx = store.begin().await.unwrap();
        for item in [&a, &b, &doc] {
            tx.insert_item(item).await.unwrap();
        }
        doc.parent_id = Some(b.id);
        tx.update_item(&doc).await.unwrap();

        assert!(tx.list_children(a.id).await.unwrap().is_empty());
        let under_b = tx.list_children(b.id).await.unwrap();
        assert_eq!(under_b.len(), 1);
        assert_eq!(under_b[0].id, doc.id);
    }

    #[tokio::test]
    async fn test_upsert_share_overwrites_role() {
        use drive_entity::share::ShareRole;

        let store = MemoryStore::new();
        let root = Item::new_folder(Uuid::new_v4(), None, "root");
        let target = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&root).await.unwrap();
        let first = tx
            .upsert_share(&ItemShare::new(root.id, target, ShareRole::Viewer))
            .await
            .unwrap();
        let second = tx
            .upsert_share(&ItemShare::new(root.id, target, ShareRole::Editor))
            .await
            .unwrap();

        assert_eq!(second.role, ShareRole::Editor);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(tx.list_shares_for_user(target).await.unwrap().len(), 1);

        tx.delete_item(root.id).await.unwrap();
        assert!(tx.find_share(root.id, target).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_user_is_idempotent() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let first = tx.upsert_user(&AppUser::new("user_1")).await.unwrap();
        let second = tx.upsert_user(&AppUser::new("user_1")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(
            tx.find_user_by_external_id("user_1").await.unwrap().map(|u| u.id),
            Some(first.id)
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&Item::new_folder(owner, None, "Quarterly Report"))
            .await
            .unwrap();
        tx.insert_item(&Item::new_folder(owner, None, "notes")).await.unwrap();

        let hits = tx.search_by_name("REPORT", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Quarterly Report");
    }
}
