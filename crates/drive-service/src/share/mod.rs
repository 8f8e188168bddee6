//! Root sharing.

pub mod service;

pub use service::ShareService;
