//! Item operations with access enforcement.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use drive_auth::PermissionResolver;
use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::BlobStore;
use drive_database::{DriveStore, ItemStore, UnitOfWork, finish};
use drive_entity::item::{Item, ItemSummary};
use drive_entity::permission::Access;

use crate::context::RequestContext;
use crate::tree::{DeleteReport, ItemPatch, TreeEngine};

/// Upper bound on search results per call.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Candidates fetched per requested search result, to survive access filtering.
const SEARCH_OVERFETCH: usize = 3;

/// Entry point for item reads and mutations.
#[derive(Debug, Clone)]
pub struct ItemService {
    /// Unit-of-work factory.
    pub(crate) store: Arc<dyn DriveStore>,
    /// File content store.
    pub(crate) blobs: Arc<dyn BlobStore>,
    /// Access resolver.
    pub(crate) resolver: PermissionResolver,
    /// Structural mutations.
    pub(crate) engine: TreeEngine,
}

impl ItemService {
    /// Creates a new item service.
    pub fn new(store: Arc<dyn DriveStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let resolver = PermissionResolver::new();
        Self {
            engine: TreeEngine::new(resolver, Arc::clone(&blobs)),
            store,
            blobs,
            resolver,
        }
    }

    /// Lists the caller's own roots.
    pub async fn list_root(&self, ctx: &RequestContext) -> AppResult<Vec<ItemSummary>> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_root_items(ctx.user_id).await;
        let roots = finish(tx, result).await?;
        Ok(roots.into_iter().map(ItemSummary::from).collect())
    }

    /// Lists the readable children of a folder.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<ItemSummary>> {
        let mut tx = self.store.begin().await?;
        let result = self.readable_children(tx.as_mut(), ctx.user_id, folder_id).await;
        finish(tx, result).await
    }

    async fn readable_children(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Vec<ItemSummary>> {
        let access = self.resolver.access_for(&mut *tx, user_id, folder_id).await?;
        if !access.can_read() {
            return Err(AppError::forbidden(format!("No access to folder {folder_id}")));
        }

        let folder = tx
            .find_item(folder_id)
            .await?
            .filter(Item::is_folder)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let mut visible = Vec::new();
        for child in tx.list_children(folder.id).await? {
            if self
                .resolver
                .access_for(&mut *tx, user_id, child.id)
                .await?
                .can_read()
            {
                visible.push(ItemSummary::from(child));
            }
        }
        Ok(visible)
    }

    /// Gets a single item the caller can read.
    pub async fn get_item(&self, ctx: &RequestContext, item_id: Uuid) -> AppResult<ItemSummary> {
        let mut tx = self.store.begin().await?;
        let result = self
            .readable_item(tx.as_mut(), ctx.user_id, item_id)
            .await
            .map(ItemSummary::from);
        finish(tx, result).await
    }

    async fn readable_item(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Item> {
        let item = tx
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))?;
        self.resolver
            .require(&mut *tx, user_id, item_id, Access::Viewer)
            .await?;
        Ok(item)
    }

    /// Creates a folder under `parent_id`, or a new root when `None`.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<ItemSummary> {
        let mut tx = self.store.begin().await?;
        let result = self
            .engine
            .create_folder(tx.as_mut(), ctx.user_id, parent_id, name)
            .await
            .map(ItemSummary::from);
        finish(tx, result).await
    }

    /// Renames and/or moves an item.
    pub async fn patch_item(
        &self,
        ctx: &RequestContext,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> AppResult<ItemSummary> {
        let mut tx = self.store.begin().await?;
        let result = self
            .engine
            .patch_item(tx.as_mut(), ctx.user_id, item_id, patch)
            .await
            .map(ItemSummary::from);
        finish(tx, result).await
    }

    /// Deletes an item and its whole subtree.
    pub async fn delete_item(&self, ctx: &RequestContext, item_id: Uuid) -> AppResult<DeleteReport> {
        let mut tx = self.store.begin().await?;
        let result = self
            .engine
            .cascading_delete(tx.as_mut(), ctx.user_id, item_id)
            .await;
        finish(tx, result).await
    }

    /// Case-insensitive name search over everything the caller can read.
    ///
    /// `limit` is clamped to `1..=50`; a blank query matches nothing.
    pub async fn search_by_name(
        &self,
        ctx: &RequestContext,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<ItemSummary>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

        let mut tx = self.store.begin().await?;
        let result = self
            .readable_matches(tx.as_mut(), ctx.user_id, query, limit)
            .await;
        let hits = finish(tx, result).await?;
        debug!(query, limit, hits = hits.len(), "Search completed");
        Ok(hits)
    }

    async fn readable_matches(
        &self,
        tx: &mut dyn UnitOfWork,
        user_id: Uuid,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<ItemSummary>> {
        let candidates = tx.search_by_name(query, limit * SEARCH_OVERFETCH).await?;

        let mut hits = Vec::with_capacity(limit);
        for item in candidates {
            if hits.len() == limit {
                break;
            }
            if self
                .resolver
                .access_for(&mut *tx, user_id, item.id)
                .await?
                .can_read()
            {
                hits.push(ItemSummary::from(item));
            }
        }
        Ok(hits)
    }
}
