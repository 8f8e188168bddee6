//! File download with access enforcement.

use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::ByteStream;
use drive_core::traits::blob::DEFAULT_CONTENT_TYPE;
use drive_database::{ItemStore, UnitOfWork, finish};
use drive_entity::item::Item;
use drive_entity::permission::Access;

use super::service::ItemService;
use crate::context::RequestContext;

/// A file ready to be streamed to the caller.
pub struct DownloadedFile {
    /// File content.
    pub stream: ByteStream,
    /// MIME type for the Content-Type header.
    pub mime_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
    /// Recorded size in bytes.
    pub size_bytes: Option<i64>,
}

impl std::fmt::Debug for DownloadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadedFile")
            .field("mime_type", &self.mime_type)
            .field("filename", &self.filename)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

impl ItemService {
    /// Opens a file for reading, checking viewer access.
    pub async fn download_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DownloadedFile> {
        let mut tx = self.store.begin().await?;
        let result = self.readable_file(tx.as_mut(), ctx.user_id, file_id).await;
        let file = finish(tx, result).await?;

        let key = file
            .blob_key
            .as_deref()
            .ok_or_else(|| AppError::internal(format!("File {file_id} has no blob key")))?;
        let object = self.blobs.get(key).await?;

        let mime_type = object
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .or_else(|| file.mime_type.clone())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let filename = if file.name.trim().is_empty() {
            "file".to_string()
        } else {
            file.name.clone()
        };

        Ok(DownloadedFile {
            stream: object.stream,
            mime_type,
            filename,
            size_bytes: file.size_bytes,
        })
    }

    async fn readable_file(&self, tx: &mut dyn UnitOfWork, user_id: Uuid, file_id: Uuid) -> AppResult<Item> {
        let file = tx
            .find_item(file_id)
            .await?
            .filter(Item::is_file)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.resolver
            .require(&mut *tx, user_id, file_id, Access::Viewer)
            .await?;
        Ok(file)
    }
}
