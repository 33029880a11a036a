//! Shared types for T-Shirt Vault
//!
//! Domain models, the unified error system, the filter/sort engine, bulk
//! action types and the realtime change protocol. Used by both the server
//! and the client library; no I/O.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod models;
pub mod realtime;
pub mod upload;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
