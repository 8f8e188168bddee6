//! Structural mutations of the item forest.
//!
//! Every method runs inside a unit of work supplied by the caller and
//! leaves commit or rollback to it. The forest invariants hold after each
//! method returns `Ok`: parents are folders, and no item is its own
//! ancestor.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use drive_auth::PermissionResolver;
use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::BlobStore;
use drive_database::{ItemStore, UnitOfWork};
use drive_database::tree;
use drive_entity::item::Item;
use drive_entity::permission::Access;

/// Requested changes to an item. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    /// New name. Blank names are ignored.
    pub name: Option<String>,
    /// New parent folder.
    pub parent_id: Option<Uuid>,
}

/// Outcome of a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Item rows removed.
    pub items_deleted: usize,
    /// Blobs removed.
    pub blobs_deleted: usize,
    /// Blob deletions that failed and were skipped.
    pub blob_failures: usize,
}

/// Performs create, rename, move, and cascading delete on the item forest.
#[derive(Debug, Clone)]
pub struct TreeEngine {
    resolver: PermissionResolver,
    blobs: Arc<dyn BlobStore>,
}

impl TreeEngine {
    /// Creates a new tree engine.
    pub fn new(resolver: PermissionResolver, blobs: Arc<dyn BlobStore>) -> Self {
        Self { resolver, blobs }
    }

    /// Load `parent_id` and check that the caller may add children to it.
    ///
    /// Missing parent is `NotFound`, a file is `BadRequest`, and access
    /// below EDITOR is `Forbidden`.
    pub async fn require_writable_folder(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> AppResult<Item> {
        let parent = tx
            .find_item(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Parent {parent_id} not found")))?;
        if !parent.is_folder() {
            return Err(AppError::bad_request("Parent must be a folder"));
        }
        self.resolver
            .require(&mut *tx, user_id, parent_id, Access::Editor)
            .await?;
        Ok(parent)
    }

    /// Create a folder under `parent_id`, or a new root owned by the caller.
    pub async fn create_folder(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Item> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Folder name cannot be empty"));
        }
        if let Some(parent_id) = parent_id {
            self.require_writable_folder(&mut *tx, user_id, parent_id)
                .await?;
        }

        let folder = Item::new_folder(user_id, parent_id, name);
        tx.insert_item(&folder).await?;

        info!(
            item_id = %folder.id,
            parent_id = ?folder.parent_id,
            %user_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename and/or move an item. Both changes apply together or not at all.
    pub async fn patch_item(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> AppResult<Item> {
        let mut item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))?;
        self.resolver
            .require(&mut *tx, user_id, item_id, Access::Editor)
            .await?;

        let mut changed = false;

        if let Some(name) = patch.name.filter(|n| !n.trim().is_empty()) {
            item.name = name;
            changed = true;
        }

        if let Some(destination_id) = patch.parent_id {
            self.resolver
                .require(&mut *tx, user_id, destination_id, Access::Editor)
                .await?;

            let destination = tx.find_item(destination_id).await?;
            if !destination.as_ref().is_some_and(Item::is_folder) {
                return Err(AppError::bad_request("Destination must be a folder"));
            }
            if tree::exists_in_subtree(&mut *tx, item_id, destination_id).await? {
                return Err(AppError::bad_request(
                    "Cannot move an item into its own subtree",
                ));
            }

            item.parent_id = Some(destination_id);
            changed = true;
        }

        if changed {
            item.updated_at = Utc::now();
            tx.update_item(&item).await?;
            info!(
                %item_id,
                name = %item.name,
                parent_id = ?item.parent_id,
                %user_id,
                "Item updated"
            );
        }

        Ok(item)
    }

    /// Delete an item and everything below it.
    ///
    /// Blobs go first and failures are only counted; rows then go
    /// deepest-first. A missing item is a successful no-op.
    pub async fn cascading_delete(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<DeleteReport> {
        let mut report = DeleteReport::default();

        if tx.find_item(item_id).await?.is_none() {
            return Ok(report);
        }
        self.resolver
            .require(&mut *tx, user_id, item_id, Access::Editor)
            .await?;

        for key in tree::list_file_keys_in_subtree(&mut *tx, item_id).await? {
            match self.blobs.delete(&key).await {
                Ok(()) => report.blobs_deleted += 1,
                Err(e) => {
                    warn!(%item_id, key = %key, error = %e, "Failed to delete blob, skipping");
                    report.blob_failures += 1;
                }
            }
        }

        for id in tree::subtree_ids_deepest_first(&mut *tx, item_id).await? {
            if tx.delete_item(id).await? {
                report.items_deleted += 1;
            }
        }

        info!(
            %item_id,
            %user_id,
            items_deleted = report.items_deleted,
            blobs_deleted = report.blobs_deleted,
            blob_failures = report.blob_failures,
            "Subtree deleted"
        );
        Ok(report)
    }
}
