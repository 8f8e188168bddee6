//! Tree mutation engine.

pub mod engine;

pub use engine::{DeleteReport, ItemPatch, TreeEngine};
