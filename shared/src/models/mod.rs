//! Data models
//!
//! Shared between the server, the client library and front ends (via API).
//! Row types that map 1:1 onto a table use
//! `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Catalog items, collections and images use snowflake `i64` ids; users and
//! profiles use the auth provider's `Uuid`.

pub mod catalog_item;
pub mod collection;
pub mod item_image;
pub mod profile;

// Re-exports
pub use catalog_item::*;
pub use collection::*;
pub use item_image::*;
pub use profile::*;
