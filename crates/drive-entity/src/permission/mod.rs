//! Effective access levels.

pub mod access;

pub use access::Access;
