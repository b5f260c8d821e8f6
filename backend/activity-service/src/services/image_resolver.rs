/// Image resolution for activity thumbnails
use async_trait::async_trait;
use object_storage::{S3ObjectStore, StorageError};
use std::sync::Arc;
use tracing::warn;

/// Seam over the storage subsystem so the resolver is testable without S3
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn public_url(&self, key: &str) -> Result<String, StorageError>;
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        S3ObjectStore::public_url(self, key).await
    }
}

/// Resolves a post's display image to a URL, or none.
///
/// An attached binary resource is authoritative and resolves through the
/// object store; a literal URL string is returned verbatim. A store
/// failure surfaces as an absent image, never as an error.
#[derive(Clone)]
pub struct ImageResolver {
    store: Arc<dyn ObjectStore>,
}

impl ImageResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(
        &self,
        attachment_key: Option<&str>,
        literal_url: Option<&str>,
    ) -> Option<String> {
        if let Some(key) = attachment_key {
            return match self.store.public_url(key).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(key, error = %e, "failed to resolve post image URL");
                    None
                }
            };
        }

        literal_url.map(|url| url.to_string())
    }
}
