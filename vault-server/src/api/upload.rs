//! Upload relay
//!
//! POST /api/upload: multipart `file` → validate → media host
//! DELETE /api/upload/{public_id}: remove a previous upload
//!
//! Unlike the rest of the API these endpoints answer with a bare
//! `{url, public_id}` / `{error}` body.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use shared::upload::{MAX_UPLOAD_BYTES, UploadErrorBody, UploadResponse, is_image_mime};

use crate::auth::UserIdentity;
use crate::auth::session::identity_from_headers;
use crate::media::{self, MediaError};
use crate::state::AppState;

/// Multipart framing allowance on top of the file itself
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES * 2;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_image))
        .route("/api/upload/{*public_id}", delete(delete_upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

/// Failure with the status it maps to
#[derive(Debug)]
pub struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        (self.status, Json(UploadErrorBody::new(self.message))).into_response()
    }
}

fn caller(state: &AppState, headers: &HeaderMap) -> Result<UserIdentity, UploadError> {
    identity_from_headers(headers, &state.jwt_secret)
        .ok_or_else(|| UploadError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

/// A file pulled out of the multipart body
struct FilePart {
    bytes: Vec<u8>,
    content_type: String,
}

async fn read_file(multipart: &mut Multipart) -> Result<Option<FilePart>, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| {
                field
                    .file_name()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|m| m.essence_str().to_string())
            })
            .unwrap_or_default();
        if !is_image_mime(&content_type) {
            return Err(UploadError::bad_request("File must be an image"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::new(e.status(), e.body_text()))?;
        return Ok(Some(FilePart {
            bytes: bytes.to_vec(),
            content_type,
        }));
    }
    Ok(None)
}

/// POST /api/upload
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let identity = caller(&state, &headers)?;

    let file = read_file(&mut multipart)
        .await?
        .ok_or_else(|| UploadError::bad_request("No file provided"))?;
    if file.bytes.is_empty() {
        return Err(UploadError::bad_request("File is empty"));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "File must be smaller than 5MB",
        ));
    }

    let format = image::guess_format(&file.bytes)
        .map_err(|_| UploadError::bad_request("File is not a valid image"))?;
    let ext = format.extensions_str().first().copied().unwrap_or("img");

    let size = file.bytes.len();
    let stored = media::store(
        state.media.as_ref(),
        identity.user_id,
        file.bytes,
        ext,
        &file.content_type,
    )
    .await
    .map_err(|e| {
        tracing::error!(user_id = %identity.user_id, "Upload relay failed: {e}");
        UploadError::new(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
    })?;

    tracing::info!(
        user_id = %identity.user_id,
        public_id = %stored.public_id,
        size,
        "Image uploaded"
    );
    Ok(Json(UploadResponse {
        url: stored.url,
        public_id: stored.public_id,
    }))
}

/// DELETE /api/upload/{public_id}
pub async fn delete_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(public_id): Path<String>,
) -> Result<StatusCode, UploadError> {
    let identity = caller(&state, &headers)?;

    let prefix = media::user_prefix(state.media.folder(), identity.user_id);
    if !public_id.starts_with(&prefix) || public_id.contains("..") {
        return Err(UploadError::new(StatusCode::FORBIDDEN, "Not your upload"));
    }

    match state.media.delete(&public_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(MediaError::NotFound(_)) => {
            Err(UploadError::new(StatusCode::NOT_FOUND, "Upload not found"))
        }
        Err(e) => {
            tracing::error!(user_id = %identity.user_id, "Media delete failed: {e}");
            Err(UploadError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Delete failed",
            ))
        }
    }
}
