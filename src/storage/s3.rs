//! S3-compatible storage backend.

use super::{AssetRef, AssetStore, StorageError};
use crate::app_config::StorageConfig;
use async_trait::async_trait;
use rusoto_core::{credential::StaticProvider, HttpClient, Region};
use rusoto_s3::{DeleteObjectRequest, S3Client, S3};

/// S3-compatible storage backend. Object keys are the asset path as it
/// appears in the public URL.
pub struct S3Storage {
    s3: S3Client,
    bucket_name: String,
}

impl S3Storage {
    /// Create a new S3 storage backend using the default credential chain.
    pub fn new(region: Region, bucket_name: String) -> S3Storage {
        log::info!("S3Storage initialized for bucket: {}", bucket_name);

        S3Storage {
            s3: S3Client::new(region),
            bucket_name,
        }
    }

    /// Custom endpoint with static keys when they are configured, otherwise
    /// the default credential chain.
    pub fn from_config(config: &StorageConfig) -> Result<S3Storage, StorageError> {
        let region = Region::Custom {
            name: config.s3_region.clone(),
            endpoint: config.s3_endpoint.clone(),
        };

        if config.s3_access_key.is_empty() {
            return Ok(Self::new(region, config.s3_bucket.clone()));
        }

        let http = HttpClient::new().map_err(|e| StorageError::S3(e.to_string()))?;
        let credentials = StaticProvider::new_minimal(
            config.s3_access_key.clone(),
            config.s3_secret_key.clone(),
        );

        log::info!("S3Storage initialized for bucket: {}", config.s3_bucket);

        Ok(S3Storage {
            s3: S3Client::new_with(http, credentials, region),
            bucket_name: config.s3_bucket.clone(),
        })
    }
}

#[async_trait]
impl AssetStore for S3Storage {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError> {
        log::info!("S3Storage: delete_object: {}", asset.path);

        let request = DeleteObjectRequest {
            bucket: self.bucket_name.clone(),
            key: asset.path.clone(),
            ..Default::default()
        };

        self.s3
            .delete_object(request)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }
}
