//! Client error types

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("{message} (code {code})")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Rejected locally before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upload relay answered with `{error}`
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Realtime socket failure
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        match err.code {
            ErrorCode::NotAuthenticated | ErrorCode::TokenInvalid | ErrorCode::TokenExpired => {
                ClientError::Unauthorized
            }
            code => ClientError::Api {
                code,
                message: err.message,
                details: err.details,
            },
        }
    }
}

impl ClientError {
    /// Error code reported by the server, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            ClientError::Unauthorized => Some(ErrorCode::NotAuthenticated),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_become_unauthorized() {
        let err: ClientError = AppError::not_authenticated().into();
        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[test]
    fn api_errors_keep_details() {
        let err: ClientError = AppError::price_required(Some(4)).into();
        assert_eq!(err.code(), Some(ErrorCode::PriceRequired));
        let ClientError::Api { details, .. } = err else {
            panic!("expected api error");
        };
        assert_eq!(details.unwrap()["id"], 4);
    }
}
