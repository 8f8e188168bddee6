//! Blob store trait for pluggable file content backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Content type used when neither the caller nor the backend knows better.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A blob read back from the store.
pub struct BlobObject {
    /// The blob content.
    pub stream: ByteStream,
    /// Content type recorded at `put` time, if the backend kept one.
    pub content_type: Option<String>,
}

impl std::fmt::Debug for BlobObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobObject")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Trait for blob storage backends.
///
/// Keys are opaque strings chosen by the caller. No transactional guarantee
/// with the metadata store is implied.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` under `key`, replacing any previous content.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Open the blob stored under `key`. Missing keys are `NotFound`.
    async fn get(&self, key: &str) -> AppResult<BlobObject>;

    /// Delete the blob stored under `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
