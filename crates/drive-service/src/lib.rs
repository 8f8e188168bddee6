//! # drive-service
//!
//! Business logic service layer for Drive. Every public operation opens one
//! unit of work, resolves the caller's access through
//! [`drive_auth::PermissionResolver`], performs its reads and writes, and
//! commits, rolling back on any error.
//!
//! Services follow constructor injection: the store and the blob store are
//! provided at construction time via `Arc` references.

pub mod context;
pub mod identity;
pub mod item;
pub mod services;
pub mod share;
pub mod tree;

pub use context::RequestContext;
pub use identity::{IdentityService, Me};
pub use item::{DownloadedFile, FileUpload, ItemService};
pub use services::DriveServices;
pub use share::ShareService;
pub use tree::{DeleteReport, ItemPatch, TreeEngine};
