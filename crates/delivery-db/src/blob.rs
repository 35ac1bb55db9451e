//! Public-URL blob storage for uploaded images.

use crate::DbError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Bucket/path object storage that serves uploads under a public URL.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store bytes at `bucket/path` and return the public URL.
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<String, DbError>;

    /// Remove objects. Missing paths are ignored.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), DbError>;

    /// Public URL for an object path.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Extract the in-bucket object path from a public URL.
///
/// Everything after the first `/{bucket}/` segment is the path, so
/// `https://cdn/object/public/complements/a.png` yields `a.png` for bucket
/// `complements`.
pub fn path_from_public_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{}/", bucket.trim_matches('/'));
    let (_, rest) = url.split_once(&marker)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_string())
}

/// Random object name keeping the original file extension.
pub fn unique_file_name(original: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match original.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => format!("{}.{}", id, ext),
        _ => id.to_string(),
    }
}

/// In-memory [`BlobStorage`].
pub struct MemoryBlobStorage {
    base_url: String,
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Check whether an object exists.
    pub async fn contains(&self, bucket: &str, path: &str) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(bucket.to_string(), path.to_string()))
    }

    /// Number of stored objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<String, DbError> {
        if path.is_empty() {
            return Err(DbError::Blob("empty object path".to_string()));
        }
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), path.to_string()), bytes);
        Ok(self.public_url(bucket, path))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), DbError> {
        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_public_url() {
        let url = "https://cdn.test/object/public/images/store/logo-1.png";
        assert_eq!(
            path_from_public_url(url, "images"),
            Some("store/logo-1.png".to_string())
        );
        assert_eq!(path_from_public_url("https://cdn.test/x.png", "complements"), None);
    }

    #[test]
    fn test_unique_file_name_keeps_extension() {
        let a = unique_file_name("photo.jpeg");
        let b = unique_file_name("photo.jpeg");
        assert!(a.ends_with(".jpeg"));
        assert_ne!(a, b);
        assert!(!unique_file_name("noext").contains('.'));
    }

    #[tokio::test]
    async fn test_upload_and_remove() {
        let blobs = MemoryBlobStorage::new("https://cdn.test/");
        let url = blobs
            .upload("complements", "a.png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/object/public/complements/a.png");
        assert!(blobs.contains("complements", "a.png").await);

        let path = path_from_public_url(&url, "complements").unwrap();
        assert_eq!(path, "a.png");
        blobs.remove("complements", &[path]).await.unwrap();
        assert!(blobs.is_empty().await);
    }
}
