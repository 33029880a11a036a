//! vault-client: client library for vault-server
//!
//! Provides the HTTP API client, the collection view controller (local cache
//! with optimistic updates), client-side upload validation and the realtime
//! change subscription.

pub mod config;
pub mod error;
pub mod http;
pub mod realtime;
pub mod upload;
pub mod view;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{CatalogApi, HttpClient};
pub use upload::{UploadOutcome, Uploader};
pub use view::{BulkOutcome, CollectionView, PriceSource};

// Re-export shared types for convenience
pub use shared::error::ApiResponse;
