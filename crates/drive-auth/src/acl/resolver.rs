//! Effective access resolver.
//!
//! Resolution order:
//! 1. Missing item, or a broken link on the way up: no access.
//! 2. Owner check: the owner of the root has EDITOR.
//! 3. Share: the role of the share on the root naming the user.
//! 4. Otherwise no access.

use std::collections::HashSet;

use tracing::{error, trace};
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_database::store::{ItemStore, ShareStore};
use drive_entity::item::Item;
use drive_entity::permission::Access;

/// Where an access level was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    /// The user owns the root of the node's tree.
    Owner,
    /// A share on the root names the user.
    Share,
    /// No applicable grant.
    Denied,
}

/// Result of resolving access for a user on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveAccess {
    /// The resolved access level.
    pub access: Access,
    /// The root the access was derived from, if the chain was intact.
    pub root_id: Option<Uuid>,
    /// Where the access came from.
    pub source: AccessSource,
}

impl EffectiveAccess {
    fn denied(root_id: Option<Uuid>) -> Self {
        Self {
            access: Access::None,
            root_id,
            source: AccessSource::Denied,
        }
    }
}

/// Resolves a user's access to a node from ownership and root shares.
///
/// Stateless; every call reads through the unit of work it is given so
/// checks and mutations observe the same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve access with its provenance.
    pub async fn resolve<S>(&self, store: &mut S, user_id: Uuid, item_id: Uuid) -> AppResult<EffectiveAccess>
    where
        S: ItemStore + ShareStore + ?Sized,
    {
        let Some(item) = store.find_item(item_id).await? else {
            return Ok(EffectiveAccess::denied(None));
        };
        let Some(root) = find_root(store, item).await? else {
            return Ok(EffectiveAccess::denied(None));
        };

        if root.owner_id == user_id {
            return Ok(EffectiveAccess {
                access: Access::Editor,
                root_id: Some(root.id),
                source: AccessSource::Owner,
            });
        }

        match store.find_share(root.id, user_id).await? {
            Some(share) => Ok(EffectiveAccess {
                access: Access::from(share.role),
                root_id: Some(root.id),
                source: AccessSource::Share,
            }),
            None => Ok(EffectiveAccess::denied(Some(root.id))),
        }
    }

    /// Resolve the access level of `user_id` on `item_id`.
    pub async fn access_for<S>(&self, store: &mut S, user_id: Uuid, item_id: Uuid) -> AppResult<Access>
    where
        S: ItemStore + ShareStore + ?Sized,
    {
        let resolved = self.resolve(store, user_id, item_id).await?;
        trace!(%user_id, %item_id, access = %resolved.access, "Resolved access");
        Ok(resolved.access)
    }

    /// Fail with `Forbidden` unless `user_id` has at least `required` on `item_id`.
    pub async fn require<S>(
        &self,
        store: &mut S,
        user_id: Uuid,
        item_id: Uuid,
        required: Access,
    ) -> AppResult<Access>
    where
        S: ItemStore + ShareStore + ?Sized,
    {
        let access = self.access_for(store, user_id, item_id).await?;
        if !access.satisfies(required) {
            return Err(AppError::forbidden(format!(
                "{required} access required on item {item_id}"
            )));
        }
        Ok(access)
    }
}

/// Follow parent links from `item` to its root. `None` if a link is missing.
async fn find_root<S>(store: &mut S, item: Item) -> AppResult<Option<Item>>
where
    S: ItemStore + ?Sized,
{
    let mut visited = HashSet::new();
    let mut current = item;

    loop {
        if !visited.insert(current.id) {
            error!(item_id = %current.id, "Cycle in parent chain");
            return Err(AppError::internal(format!(
                "Cycle detected in parent chain at item {}",
                current.id
            )));
        }
        let Some(parent_id) = current.parent_id else {
            return Ok(Some(current));
        };
        match store.find_item(parent_id).await? {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::ErrorKind;
    use drive_database::store::{DriveStore, UnitOfWork};
    use drive_database::MemoryStore;
    use drive_entity::share::{ItemShare, ShareRole};

    struct Fixture {
        store: MemoryStore,
        owner: Uuid,
        root: Item,
        leaf: Item,
    }

    /// `root/{mid/{leaf.txt}}` owned by a fresh user.
    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let root = Item::new_folder(owner, None, "root");
        let mid = Item::new_folder(owner, Some(root.id), "mid");
        let leaf = Item::new_file(owner, Some(mid.id), "leaf.txt", None, 3);

        let mut tx = store.begin().await.unwrap();
        for item in [&root, &mid, &leaf] {
            tx.insert_item(item).await.unwrap();
        }
        tx.commit().await.unwrap();

        Fixture {
            store,
            owner,
            root,
            leaf,
        }
    }

    #[tokio::test]
    async fn test_owner_has_editor_everywhere() {
        let f = fixture().await;
        let resolver = PermissionResolver::new();
        let mut tx = f.store.begin().await.unwrap();

        for id in [f.root.id, f.leaf.id] {
            let resolved = resolver.resolve(tx.as_mut(), f.owner, id).await.unwrap();
            assert_eq!(resolved.access, Access::Editor);
            assert_eq!(resolved.source, AccessSource::Owner);
            assert_eq!(resolved.root_id, Some(f.root.id));
        }
    }

    #[tokio::test]
    async fn test_stranger_has_none() {
        let f = fixture().await;
        let resolver = PermissionResolver::new();
        let mut tx = f.store.begin().await.unwrap();

        let access = resolver
            .access_for(tx.as_mut(), Uuid::new_v4(), f.leaf.id)
            .await
            .unwrap();
        assert_eq!(access, Access::None);
    }

    #[tokio::test]
    async fn test_missing_item_has_none() {
        let f = fixture().await;
        let resolver = PermissionResolver::new();
        let mut tx = f.store.begin().await.unwrap();

        let resolved = resolver
            .resolve(tx.as_mut(), f.owner, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(resolved, EffectiveAccess::denied(None));
    }

    #[tokio::test]
    async fn test_viewer_share_reaches_descendants_read_only() {
        let f = fixture().await;
        let resolver = PermissionResolver::new();
        let viewer = Uuid::new_v4();
        let mut tx = f.store.begin().await.unwrap();
        tx.upsert_share(&ItemShare::new(f.root.id, viewer, ShareRole::Viewer))
            .await
            .unwrap();

        let access = resolver.access_for(tx.as_mut(), viewer, f.leaf.id).await.unwrap();
        assert_eq!(access, Access::Viewer);
        assert!(access.can_read());
        assert!(!access.can_write());

        let err = resolver
            .require(tx.as_mut(), viewer, f.leaf.id, Access::Editor)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        resolver
            .require(tx.as_mut(), viewer, f.leaf.id, Access::Viewer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_editor_share_grants_write() {
        let f = fixture().await;
        let resolver = PermissionResolver::new();
        let editor = Uuid::new_v4();
        let mut tx = f.store.begin().await.unwrap();
        tx.upsert_share(&ItemShare::new(f.root.id, editor, ShareRole::Editor))
            .await
            .unwrap();

        let resolved = resolver.resolve(tx.as_mut(), editor, f.leaf.id).await.unwrap();
        assert_eq!(resolved.access, Access::Editor);
        assert_eq!(resolved.source, AccessSource::Share);
    }

    #[tokio::test]
    async fn test_corrupt_cycle_is_internal_error() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut a = Item::new_folder(owner, None, "a");
        let b = Item::new_folder(owner, Some(a.id), "b");

        let mut tx = store.begin().await.unwrap();
        tx.insert_item(&a).await.unwrap();
        tx.insert_item(&b).await.unwrap();
        a.parent_id = Some(b.id);
        tx.update_item(&a).await.unwrap();

        let err = PermissionResolver::new()
            .access_for(tx.as_mut(), owner, b.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
