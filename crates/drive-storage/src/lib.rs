//! # drive-storage
//!
//! Blob store providers for Drive. Supports the local filesystem, an
//! in-memory map for tests and development, and S3-compatible object stores
//! behind the `s3` feature.

pub mod factory;
pub mod providers;

pub use factory::build_blob_store;
