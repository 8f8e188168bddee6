//! Local filesystem blob store.
//!
//! A blob with key `k` is stored at `<root>/k`; its content type is kept in
//! a JSON sidecar at `<root>/k.meta.json`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::{BlobObject, BlobStore};

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct BlobMeta {
    content_type: String,
}

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a key to a path within the root, rejecting keys that escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.trim().is_empty() || escapes {
            return Err(AppError::bad_request(format!("Invalid blob key: '{key}'")));
        }
        Ok(self.root.join(relative))
    }

    fn sidecar(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }

    async fn read_content_type(path: &Path) -> AppResult<Option<String>> {
        match fs::read(Self::sidecar(path)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice::<BlobMeta>(&raw)?.content_type)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to read blob metadata",
                e,
            )),
        }
    }

    async fn remove_if_present(path: &Path, key: &str) -> AppResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {key}"),
                e,
            )),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;

        let meta = serde_json::to_vec(&BlobMeta {
            content_type: content_type.to_string(),
        })?;
        fs::write(Self::sidecar(&full_path), meta)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write blob metadata", e)
            })?;

        debug!(key, bytes = data.len(), content_type, "Wrote blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<BlobObject> {
        let full_path = self.resolve(key)?;
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open blob: {key}"), e)
            }
        })?;
        let content_type = Self::read_content_type(&full_path).await?;

        Ok(BlobObject {
            stream: Box::pin(ReaderStream::new(file)),
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        Self::remove_if_present(&full_path, key).await?;
        Self::remove_if_present(&Self::sidecar(&full_path), key).await?;
        debug!(key, "Deleted blob");
        Ok(())
    }
}
