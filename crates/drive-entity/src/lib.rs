//! # drive-entity
//!
//! Domain entity models for Drive. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.

pub mod item;
pub mod permission;
pub mod share;
pub mod user;
