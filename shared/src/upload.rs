//! Upload relay wire types and limits

use serde::{Deserialize, Serialize};

/// Maximum accepted image size (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Storage folder used when none is configured
pub const DEFAULT_MEDIA_FOLDER: &str = "tshirt-vault";

/// Whether a declared MIME type is an image type
pub fn is_image_mime(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Successful upload: durable URL plus the host's identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub public_id: String,
}

/// Failed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadErrorBody {
    pub error: String,
}

impl UploadErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mime_prefix() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("Image/JPEG"));
        assert!(!is_image_mime("application/pdf"));
        assert!(!is_image_mime("text/plain"));
    }
}
