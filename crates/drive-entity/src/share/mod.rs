//! Root-share domain entities.

pub mod model;

pub use model::{ItemShare, ShareRole};
