//! # drive-auth
//!
//! Authorization for Drive. A user's access to any node is derived from the
//! node's root: the root's owner has full access, users named by a share on
//! the root get the shared role, everyone else gets nothing.

pub mod acl;

pub use acl::{AccessSource, EffectiveAccess, PermissionResolver};
