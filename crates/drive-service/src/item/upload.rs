//! File upload: metadata first, then content.

use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::blob::DEFAULT_CONTENT_TYPE;
use drive_database::{ItemStore, UnitOfWork, finish};
use drive_entity::item::{Item, ItemSummary};

use super::service::ItemService;
use crate::context::RequestContext;

/// Name given to uploads that arrive without one.
const FALLBACK_FILENAME: &str = "file";

/// An uploaded file as handed over by the transport.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Client-supplied file name.
    pub filename: String,
    /// Client-supplied content type.
    pub content_type: Option<String>,
    /// File content.
    pub content: Bytes,
}

impl FileUpload {
    /// Creates an upload from its parts.
    pub fn new(filename: impl Into<String>, content_type: Option<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            content,
        }
    }
}

impl ItemService {
    /// Stores a new file under `parent_id`, or as a new root when `None`.
    ///
    /// The metadata row is committed before the content is written. If the
    /// content write fails the error is returned and the row stays behind
    /// without content.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        upload: FileUpload,
    ) -> AppResult<ItemSummary> {
        let name = if upload.filename.trim().is_empty() {
            FALLBACK_FILENAME.to_string()
        } else {
            upload.filename
        };
        let content_type = upload.content_type.filter(|ct| !ct.trim().is_empty());
        let item = Item::new_file(
            ctx.user_id,
            parent_id,
            name,
            content_type.clone(),
            upload.content.len() as i64,
        );

        let mut tx = self.store.begin().await?;
        let result = self.insert_file(tx.as_mut(), ctx.user_id, &item).await;
        finish(tx, result).await?;

        let key = item
            .blob_key
            .as_deref()
            .ok_or_else(|| AppError::internal(format!("File {} has no blob key", item.id)))?;
        let size = upload.content.len();
        let mime = content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        if let Err(e) = self.blobs.put(key, upload.content, mime).await {
            error!(
                item_id = %item.id,
                key,
                error = %e,
                "Content write failed after metadata commit, item has no content"
            );
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to store content for file {}", item.id),
                e,
            ));
        }

        info!(
            item_id = %item.id,
            parent_id = ?item.parent_id,
            user_id = %ctx.user_id,
            bytes = size,
            "File uploaded"
        );
        Ok(ItemSummary::from(&item))
    }

    async fn insert_file(&self, tx: &mut dyn UnitOfWork, user_id: Uuid, item: &Item) -> AppResult<()> {
        if let Some(parent_id) = item.parent_id {
            self.engine
                .require_writable_folder(&mut *tx, user_id, parent_id)
                .await?;
        }
        tx.insert_item(item).await
    }
}
