//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::{BlobObject, BlobStore};
use drive_database::{DriveStore, MemoryStore};
use drive_entity::item::ItemSummary;
use drive_service::{DownloadedFile, DriveServices, FileUpload, RequestContext};
use drive_storage::providers::MemoryBlobStore;

/// Blob store that records every delete attempt and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingBlobs {
    inner: MemoryBlobStore,
    delete_attempts: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
    fail_puts: AtomicBool,
}

impl RecordingBlobs {
    /// Make every subsequent delete fail.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent put fail.
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    /// Keys passed to `delete` so far, as a set.
    pub fn delete_attempts(&self) -> HashSet<String> {
        self.delete_attempts.lock().unwrap().iter().cloned().collect()
    }

    /// Number of `delete` calls so far.
    pub fn delete_attempt_count(&self) -> usize {
        self.delete_attempts.lock().unwrap().len()
    }

    /// Whether content exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

#[async_trait]
impl BlobStore for RecordingBlobs {
    fn provider_type(&self) -> &str {
        "recording"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::storage("blob store unavailable"));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> AppResult<BlobObject> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.delete_attempts.lock().unwrap().push(key.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::storage("blob store unavailable"));
        }
        self.inner.delete(key).await
    }
}

/// Test application context
pub struct TestApp {
    /// The in-memory metadata store
    pub store: Arc<MemoryStore>,
    /// The recording blob store
    pub blobs: Arc<RecordingBlobs>,
    /// All services wired over the two stores
    pub drive: DriveServices,
}

impl TestApp {
    /// Create a new test application over empty stores
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(RecordingBlobs::default());
        let dyn_store: Arc<dyn DriveStore> = store.clone();
        let dyn_blobs: Arc<dyn BlobStore> = blobs.clone();
        Self {
            drive: DriveServices::new(dyn_store, dyn_blobs),
            store,
            blobs,
        }
    }

    /// Resolve (creating if needed) the caller for an external identity
    pub async fn user(&self, external_identity: &str) -> RequestContext {
        self.drive
            .identity
            .context_for(external_identity)
            .await
            .expect("Failed to resolve user")
    }

    /// Create a folder and return it
    pub async fn folder(&self, ctx: &RequestContext, parent: Option<Uuid>, name: &str) -> ItemSummary {
        self.drive
            .items
            .create_folder(ctx, parent, name)
            .await
            .expect("Failed to create folder")
    }

    /// Upload a small text file and return it
    pub async fn file(&self, ctx: &RequestContext, parent: Option<Uuid>, name: &str) -> ItemSummary {
        let upload = FileUpload::new(
            name,
            Some("text/plain".to_string()),
            Bytes::from(format!("content of {name}")),
        );
        self.drive
            .items
            .upload_file(ctx, parent, upload)
            .await
            .expect("Failed to upload file")
    }
}

/// Blob key of a file item.
pub fn blob_key(item: &ItemSummary) -> String {
    drive_entity::item::blob_key_for(item.id)
}

/// Collect a download into a byte vector.
pub async fn read_all(file: DownloadedFile) -> Vec<u8> {
    let chunks: Vec<Bytes> = file.stream.try_collect().await.expect("Failed to read stream");
    chunks.concat()
}

/// IDs of a listing, in order.
pub fn ids(items: &[ItemSummary]) -> Vec<Uuid> {
    items.iter().map(|item| item.id).collect()
}
