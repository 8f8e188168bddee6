//! Core traits defined in `drive-core` and implemented by other crates.

pub mod blob;

pub use blob::{BlobObject, BlobStore, ByteStream};
