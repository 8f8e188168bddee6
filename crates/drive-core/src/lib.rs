//! # drive-core
//!
//! Core crate for Drive. Contains the blob store trait, configuration
//! schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Drive crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
