//! # drive-database
//!
//! Persistence for Drive. Every service operation runs inside one
//! [`UnitOfWork`] obtained from a [`DriveStore`]; two stores exist:
//! PostgreSQL (one `sqlx` transaction per unit of work) and an in-memory
//! arena used for tests and development.
//!
//! The recursive subtree primitives in [`tree`] are written once against
//! [`ItemStore::list_children`] and work with either backend.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;
pub mod tree;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DriveStore, ItemStore, ShareStore, UnitOfWork, UserStore, finish};
