//! Client side of the upload relay
//!
//! A picked file is checked locally, previewed right away as a `data:` URL,
//! then relayed to the server. When the relay fails the caller still gets
//! the preview, typed as [`UploadOutcome::LocalOnly`] so it is never mistaken
//! for a hosted URL.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared::upload::{MAX_UPLOAD_BYTES, UploadResponse, is_image_mime};

use crate::{ClientError, ClientResult};

/// Sends a file to the upload endpoint
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<UploadResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored by the media host; safe to persist
    Hosted { url: String, public_id: String },
    /// Relay failed; `preview_url` lives only in this client
    LocalOnly { preview_url: String, error: String },
}

impl UploadOutcome {
    /// URL to show right now
    pub fn display_url(&self) -> &str {
        match self {
            UploadOutcome::Hosted { url, .. } => url,
            UploadOutcome::LocalOnly { preview_url, .. } => preview_url,
        }
    }

    /// URL that may be saved on an item
    pub fn durable_url(&self) -> Option<&str> {
        match self {
            UploadOutcome::Hosted { url, .. } => Some(url),
            UploadOutcome::LocalOnly { .. } => None,
        }
    }
}

/// Type and size checks done before anything is sent
pub fn validate_image(content_type: &str, len: usize) -> ClientResult<()> {
    if !is_image_mime(content_type) {
        return Err(ClientError::Validation(
            "Please select an image file".to_string(),
        ));
    }
    if len == 0 {
        return Err(ClientError::Validation("File is empty".to_string()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(ClientError::Validation(
            "Image must be smaller than 5MB".to_string(),
        ));
    }
    Ok(())
}

/// Inline preview of the file
pub fn preview_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Validate, preview and relay one image
///
/// Local validation failures are errors; relay failures are not, they come
/// back as `LocalOnly`.
pub async fn upload_image<U: Uploader + ?Sized>(
    uploader: &U,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> ClientResult<UploadOutcome> {
    validate_image(content_type, bytes.len())?;
    let preview_url = preview_data_url(content_type, &bytes);

    match uploader.upload(file_name, content_type, bytes).await {
        Ok(hosted) => Ok(UploadOutcome::Hosted {
            url: hosted.url,
            public_id: hosted.public_id,
        }),
        Err(e) => {
            tracing::warn!(file_name, "Upload relay failed, keeping local preview: {e}");
            Ok(UploadOutcome::LocalOnly {
                preview_url,
                error: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedUploader(Option<UploadResponse>);

    #[async_trait]
    impl Uploader for FixedUploader {
        async fn upload(&self, _: &str, _: &str, _: Vec<u8>) -> ClientResult<UploadResponse> {
            self.0
                .clone()
                .ok_or_else(|| ClientError::Upload("host down".to_string()))
        }
    }

    #[test]
    fn rejects_non_images_and_oversize() {
        assert!(validate_image("text/plain", 10).is_err());
        assert!(validate_image("image/png", 0).is_err());
        assert!(validate_image("image/png", MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_image("image/png", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn preview_is_base64_data_url() {
        assert_eq!(preview_data_url("image/gif", b"GIF"), "data:image/gif;base64,R0lG");
    }

    #[tokio::test]
    async fn hosted_on_success() {
        let uploader = FixedUploader(Some(UploadResponse {
            url: "https://media.test/a.png".into(),
            public_id: "a".into(),
        }));
        let outcome = upload_image(&uploader, "a.png", "image/png", vec![1, 2])
            .await
            .unwrap();
        assert_eq!(outcome.durable_url(), Some("https://media.test/a.png"));
    }

    #[tokio::test]
    async fn relay_failure_keeps_preview() {
        let outcome = upload_image(&FixedUploader(None), "a.png", "image/png", vec![1, 2])
            .await
            .unwrap();
        assert_eq!(outcome.durable_url(), None);
        assert!(outcome.display_url().starts_with("data:image/png;base64,"));
        let UploadOutcome::LocalOnly { error, .. } = outcome else {
            panic!("expected local preview");
        };
        assert!(error.contains("host down"));
    }

    #[tokio::test]
    async fn invalid_file_never_reaches_uploader() {
        let err = upload_image(&FixedUploader(None), "a.txt", "text/plain", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
