//! HTTP client for the vault-server API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::auth::{LoginRequest, LoginResponse, SessionInfo, SignupRequest};
use shared::catalog::{BulkActionRequest, BulkActionResult, ViewParams};
use shared::error::ApiResponse;
use shared::models::{
    CatalogItem, CatalogItemCreate, CatalogItemUpdate, Collection, CollectionCreate,
    CollectionUpdate, ItemImage, ItemImageCreate, Profile, ProfileUpdate, PublicProfilePage,
    UsernameSetup,
};
use shared::upload::{UploadErrorBody, UploadResponse};

use crate::upload::Uploader;
use crate::{ClientConfig, ClientError, ClientResult};

/// Catalog operations the collection view depends on
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_items(&self) -> ClientResult<Vec<CatalogItem>>;
    async fn create_item(&self, data: &CatalogItemCreate) -> ClientResult<CatalogItem>;
    async fn update_item(&self, id: i64, data: &CatalogItemUpdate) -> ClientResult<CatalogItem>;
    async fn delete_item(&self, id: i64) -> ClientResult<()>;
    async fn bulk_action(&self, request: &BulkActionRequest) -> ClientResult<BulkActionResult>;
    async fn list_collections(&self) -> ClientResult<Vec<Collection>>;
    async fn create_collection(&self, data: &CollectionCreate) -> ClientResult<Collection>;
    async fn update_collection(
        &self,
        id: i64,
        data: &CollectionUpdate,
    ) -> ClientResult<Collection>;
    async fn delete_collection(&self, id: i64) -> ClientResult<()>;
}

/// HTTP client for making network requests to vault-server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Decode an `ApiResponse` envelope, success or failure
    async fn envelope<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<Option<T>> {
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(envelope) => Ok(envelope.into_result()?),
            Err(_) if status == StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            Err(e) => Err(ClientError::InvalidResponse(format!(
                "{status}: {e}: {}",
                text.chars().take(200).collect::<String>()
            ))),
        }
    }

    async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::envelope(response)
            .await?
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    async fn send_empty(request: reqwest::RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        Self::envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::send(self.request(reqwest::Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(reqwest::Method::POST, path).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::send(self.request(reqwest::Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        Self::send_empty(self.request(reqwest::Method::DELETE, path)).await
    }

    // ========== Auth API ==========

    /// Sign up and keep the issued token
    pub async fn signup(&mut self, email: &str, password: &str) -> ClientResult<SessionInfo> {
        let request = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/api/auth/signup", &request).await?;
        self.token = Some(response.token);
        Ok(response.session)
    }

    /// Log in and keep the issued token
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<SessionInfo> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/api/auth/login", &request).await?;
        self.token = Some(response.token);
        Ok(response.session)
    }

    pub async fn session(&self) -> ClientResult<SessionInfo> {
        self.get("/api/auth/session").await
    }

    pub async fn logout(&mut self) -> ClientResult<()> {
        Self::send_empty(self.request(reqwest::Method::POST, "/api/auth/logout")).await?;
        self.token = None;
        Ok(())
    }

    // ========== Catalog API ==========

    /// Items filtered and sorted by the server
    pub async fn query_items(&self, params: &ViewParams) -> ClientResult<Vec<CatalogItem>> {
        Self::send(self.request(reqwest::Method::GET, "/api/items").query(params)).await
    }

    pub async fn get_item(&self, id: i64) -> ClientResult<CatalogItem> {
        self.get(&format!("/api/items/{id}")).await
    }

    pub async fn tags(&self) -> ClientResult<Vec<String>> {
        self.get("/api/tags").await
    }

    pub async fn collection_items(&self, id: i64) -> ClientResult<Vec<CatalogItem>> {
        self.get(&format!("/api/collections/{id}/items")).await
    }

    pub async fn list_images(&self, item_id: i64) -> ClientResult<Vec<ItemImage>> {
        self.get(&format!("/api/items/{item_id}/images")).await
    }

    pub async fn add_image(&self, item_id: i64, data: &ItemImageCreate) -> ClientResult<ItemImage> {
        self.post(&format!("/api/items/{item_id}/images"), data).await
    }

    pub async fn set_primary_image(&self, item_id: i64, image_id: i64) -> ClientResult<ItemImage> {
        Self::send(self.request(
            reqwest::Method::PUT,
            &format!("/api/items/{item_id}/images/{image_id}/primary"),
        ))
        .await
    }

    pub async fn delete_image(&self, item_id: i64, image_id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/items/{item_id}/images/{image_id}"))
            .await
    }

    // ========== Profile API ==========

    pub async fn setup_username(&self, username: &str) -> ClientResult<Profile> {
        let body = UsernameSetup {
            username: username.to_string(),
        };
        self.post("/api/profile/username", &body).await
    }

    pub async fn profile(&self) -> ClientResult<Profile> {
        self.get("/api/profile").await
    }

    pub async fn update_profile(&self, data: &ProfileUpdate) -> ClientResult<Profile> {
        self.put("/api/profile", data).await
    }

    pub async fn public_profile(&self, username: &str) -> ClientResult<PublicProfilePage> {
        self.get(&format!("/api/users/{}", urlencoding::encode(username)))
            .await
    }
}

#[async_trait]
impl CatalogApi for HttpClient {
    async fn list_items(&self) -> ClientResult<Vec<CatalogItem>> {
        self.get("/api/items").await
    }

    async fn create_item(&self, data: &CatalogItemCreate) -> ClientResult<CatalogItem> {
        self.post("/api/items", data).await
    }

    async fn update_item(&self, id: i64, data: &CatalogItemUpdate) -> ClientResult<CatalogItem> {
        self.put(&format!("/api/items/{id}"), data).await
    }

    async fn delete_item(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/items/{id}")).await
    }

    async fn bulk_action(&self, request: &BulkActionRequest) -> ClientResult<BulkActionResult> {
        self.post("/api/items/bulk", request).await
    }

    async fn list_collections(&self) -> ClientResult<Vec<Collection>> {
        self.get("/api/collections").await
    }

    async fn create_collection(&self, data: &CollectionCreate) -> ClientResult<Collection> {
        self.post("/api/collections", data).await
    }

    async fn update_collection(
        &self,
        id: i64,
        data: &CollectionUpdate,
    ) -> ClientResult<Collection> {
        self.put(&format!("/api/collections/{id}"), data).await
    }

    async fn delete_collection(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/collections/{id}")).await
    }
}

#[async_trait]
impl Uploader for HttpClient {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<UploadResponse> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .request(reqwest::Method::POST, "/api/upload")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        let message = response
            .json::<UploadErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Upload failed ({status})"));
        Err(ClientError::Upload(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cleanly() {
        let client = ClientConfig::new("http://localhost:8080/")
            .build_http_client()
            .unwrap();
        assert_eq!(client.url("/api/items"), "http://localhost:8080/api/items");
        assert_eq!(client.url("api/tags"), "http://localhost:8080/api/tags");
        assert!(!client.is_logged_in());
        assert_eq!(client.with_token("t").token(), Some("t"));
    }
}
