//! Media hosting for uploaded images
//!
//! Objects are stored at `{folder}/{user_id}/{uuid}.{ext}`. The public id
//! handed back to clients is the key without its extension.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("storage request failed: {0}")]
    Storage(String),
    #[error("object not found: {0}")]
    NotFound(String),
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Key prefix every object lives under
    fn folder(&self) -> &str;

    /// Store bytes under `key` and return the public URL
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<String, MediaError>;

    /// Remove every object whose key is `public_id` plus an extension
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Prefix owned by one user
pub fn user_prefix(folder: &str, user_id: Uuid) -> String {
    format!("{folder}/{user_id}/")
}

/// Fresh object key and its public id
pub fn object_key(folder: &str, user_id: Uuid, ext: &str) -> (String, String) {
    let public_id = format!("{}{}", user_prefix(folder, user_id), Uuid::new_v4());
    (format!("{public_id}.{ext}"), public_id)
}

/// Upload bytes through a host under a fresh key
pub async fn store(
    host: &dyn MediaHost,
    user_id: Uuid,
    bytes: Vec<u8>,
    ext: &str,
    content_type: &str,
) -> Result<StoredMedia, MediaError> {
    let (key, public_id) = object_key(host.folder(), user_id, ext);
    let url = host.put(&key, bytes, content_type).await?;
    Ok(StoredMedia { url, public_id })
}

/// S3-backed host
pub struct S3MediaHost {
    client: S3Client,
    bucket: String,
    public_base_url: String,
    folder: String,
}

impl S3MediaHost {
    pub fn new(client: S3Client, bucket: String, public_base_url: String, folder: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
            folder,
        }
    }
}

#[async_trait]
impl MediaHost for S3MediaHost {
    fn folder(&self) -> &str {
        &self.folder
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "S3 upload failed");
                MediaError::Storage(e.to_string())
            })?;
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let listed = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(format!("{public_id}."))
            .send()
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))?;

        let keys: Vec<String> = listed
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();
        if keys.is_empty() {
            return Err(MediaError::NotFound(public_id.to_string()));
        }

        for key in keys {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(key = %key, error = %e, "S3 delete failed");
                    MediaError::Storage(e.to_string())
                })?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryMediaHost;
    use super::*;

    #[test]
    fn keys_are_scoped_to_user() {
        let user = Uuid::new_v4();
        let (key, public_id) = object_key("tshirt-vault", user, "png");
        assert!(key.starts_with(&format!("tshirt-vault/{user}/")));
        assert!(key.ends_with(".png"));
        assert_eq!(key, format!("{public_id}.png"));
    }

    #[tokio::test]
    async fn store_then_delete() {
        let host = MemoryMediaHost::default();
        let user = Uuid::new_v4();
        let stored = store(&host, user, vec![1, 2, 3], "jpg", "image/jpeg")
            .await
            .unwrap();
        assert!(stored.url.ends_with(".jpg"));
        assert_eq!(host.objects.len(), 1);

        host.delete(&stored.public_id).await.unwrap();
        assert!(host.objects.is_empty());
        assert!(matches!(
            host.delete(&stored.public_id).await,
            Err(MediaError::NotFound(_))
        ));
    }
}
