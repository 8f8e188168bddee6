//! External identity mapping.

pub mod service;

pub use service::{IdentityService, Me};
