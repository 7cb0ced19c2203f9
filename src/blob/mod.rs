//! Blob store boundary — binary upload and URL issuance.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::BlobError;

/// Opaque binary storage. Upload writes bytes to a path; `download_url`
/// resolves a path to a publicly usable reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobError>;

    async fn download_url(&self, path: &str) -> Result<String, BlobError>;
}

/// Map-backed blob store for tests and the local harness. URLs are
/// `memory://<path>` — stable, resolvable only within the process.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored at a path, if any. Test helper.
    pub async fn bytes_at(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        debug!(path, size = bytes.len(), "Blob uploaded");
        self.blobs.write().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        let blobs = self.blobs.read().await;
        if !blobs.contains_key(path) {
            return Err(BlobError::NotFound { path: path.into() });
        }
        Ok(format!("memory://{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_resolve_url() {
        let store = MemoryBlobStore::new();
        store
            .upload("profile_pictures/u1/123_avatar.png", vec![1, 2, 3])
            .await
            .unwrap();

        let url = store
            .download_url("profile_pictures/u1/123_avatar.png")
            .await
            .unwrap();
        assert_eq!(url, "memory://profile_pictures/u1/123_avatar.png");
        assert_eq!(
            store.bytes_at("profile_pictures/u1/123_avatar.png").await,
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn url_for_missing_path_errors() {
        let store = MemoryBlobStore::new();
        let err = store.download_url("nope").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound { .. }));
    }
}
