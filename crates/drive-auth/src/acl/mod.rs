//! Root-derived access resolution.

pub mod resolver;

pub use resolver::{AccessSource, EffectiveAccess, PermissionResolver};
