//! PostgreSQL repositories.
//!
//! Each repository borrows one connection (in practice the connection of
//! the current transaction) for the duration of a call sequence.

pub mod item;
pub mod share;
pub mod user;

pub use item::ItemRepository;
pub use share::ShareRepository;
pub use user::UserRepository;
