//! Item (file or folder) domain entities.

pub mod model;

pub use model::{Item, ItemSummary, ItemType, blob_key_for};
