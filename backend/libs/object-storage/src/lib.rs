/// Shared object-storage utilities for Pulse services
///
/// Provides a unified S3 client wrapper, configuration, and public URL
/// resolution to prevent duplication across services.
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod config;

pub use config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("presigning error: {0}")]
    Presign(String),

    #[error("s3 error: {0}")]
    S3(String),
}

/// S3-backed object store
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Arc<Client>,
    config: StorageConfig,
}

impl S3ObjectStore {
    /// Create a new store with configuration from environment
    pub async fn from_env() -> Self {
        Self::with_config(StorageConfig::from_env()).await
    }

    /// Create a new store with custom configuration
    pub async fn with_config(config: StorageConfig) -> Self {
        let aws_config = aws_config::load_from_env().await;
        let client = Client::new(&aws_config);

        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Get reference to underlying AWS S3 client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get storage configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Resolve an object key to a publicly fetchable URL.
    ///
    /// Composed from the bucket/CDN configuration by default; presigned
    /// when the deployment serves from a private bucket.
    pub async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        if !self.config.presign {
            return Ok(self.config.cdn_url(key));
        }

        let presigning = PresigningConfig::expires_in(Duration::from_secs(
            self.config.presigned_url_expiration_secs,
        ))
        .map_err(|e| StorageError::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(request.uri().to_string())
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }
}
