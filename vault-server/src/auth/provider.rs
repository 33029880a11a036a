//! Hosted auth provider (OAuth code exchange)

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

/// User returned by a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider rejected the code; message is safe to show the user
    #[error("{0}")]
    Rejected(String),
    #[error("auth provider unreachable: {0}")]
    Network(String),
    #[error("unexpected auth provider response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<ProviderUser, ProviderError>;
}

/// Provider speaking the `/auth/v1/token?grant_type=pkce` protocol
pub struct HostedAuthProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    error: Option<String>,
}

impl HostedAuthProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn exchange_code(&self, code: &str) -> Result<ProviderUser, ProviderError> {
        let url = format!("{}/auth/v1/token?grant_type=pkce", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<ErrorBody> = response.json().await.ok();
            let message = body
                .and_then(|b| b.error_description.or(b.msg).or(b.error))
                .unwrap_or_else(|| format!("Sign-in failed ({status})"));
            return Err(ProviderError::Rejected(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let email = token
            .user
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("user has no email".into()))?;

        Ok(ProviderUser {
            id: token.user.id,
            email,
        })
    }
}

#[cfg(test)]
pub mod stub {
    use super::*;

    /// Accepts exactly one code
    pub struct StubAuthProvider {
        pub code: String,
        pub user: ProviderUser,
    }

    #[async_trait]
    impl AuthProvider for StubAuthProvider {
        async fn exchange_code(&self, code: &str) -> Result<ProviderUser, ProviderError> {
            if code == self.code {
                Ok(self.user.clone())
            } else {
                Err(ProviderError::Rejected("invalid flow state".into()))
            }
        }
    }
}
