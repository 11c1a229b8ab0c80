//! Object storage for poster images and trailer videos.
//!
//! Assets are uploaded client-side; this service only removes them. Supported
//! backends:
//! - `cloudinary`: Cloudinary Admin API
//! - `s3`: S3-compatible object storage (MinIO, AWS S3, etc.)
//! - `local`: Local filesystem storage
//! - `none`: logs the deletion and does nothing else

pub mod cloudinary;
pub mod local;
pub mod s3;

use crate::app_config::StorageConfig;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// Asset not found
    NotFound(String),
    /// URL does not name an asset
    InvalidUrl(String),
    /// Backend misconfigured
    Config(String),
    /// I/O error
    Io(std::io::Error),
    /// S3 error
    S3(String),
    /// Cloudinary rejected the request
    Cloudinary(String),
    /// Transport error talking to a hosted backend
    Http(reqwest::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::InvalidUrl(msg) => write!(f, "Invalid asset URL: {}", msg),
            StorageError::Config(msg) => write!(f, "Storage config error: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::S3(msg) => write!(f, "S3 error: {}", msg),
            StorageError::Cloudinary(msg) => write!(f, "Cloudinary error: {}", msg),
            StorageError::Http(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Http(e)
    }
}

const RESOURCE_TYPES: [&str; 3] = ["image", "video", "raw"];

/// Storage reference derived from a hosted asset URL.
///
/// For `https://res.cloudinary.com/demo/video/upload/v1712/trailers/dune.mp4`:
/// resource type `video`, public id `trailers/dune`, path `trailers/dune.mp4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    pub resource_type: String,
    /// Storage key without the file extension.
    pub public_id: String,
    /// Storage key with the file extension.
    pub path: String,
}

impl AssetRef {
    pub fn from_url(raw: &str) -> Result<Self, StorageError> {
        let url = url::Url::parse(raw.trim())
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let (resource_type, key_segments) =
            match segments.iter().position(|seg| *seg == "upload") {
                Some(upload) => {
                    let resource_type = upload
                        .checked_sub(1)
                        .map(|i| segments[i])
                        .filter(|seg| RESOURCE_TYPES.contains(seg))
                        .unwrap_or("image");

                    let mut rest = &segments[upload + 1..];
                    if rest.first().map_or(false, |seg| is_version(seg)) {
                        rest = &rest[1..];
                    }
                    (resource_type, rest)
                }
                None => ("image", &segments[segments.len().saturating_sub(1)..]),
            };

        let path = key_segments.join("/");
        let public_id = strip_extension(&path).to_string();

        if public_id.is_empty() {
            return Err(StorageError::InvalidUrl(format!(
                "{}: no asset name in path",
                raw
            )));
        }

        Ok(AssetRef {
            resource_type: resource_type.to_string(),
            public_id,
            path,
        })
    }
}

/// `v` followed by one or more digits.
fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .map_or(false, |n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Drops a trailing `.ext` from the last path component only.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Trait for storage backends.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Backend name for logs and responses.
    fn name(&self) -> &'static str;

    /// Remove an asset. Fails with `NotFound` when the backend reports the
    /// asset does not exist.
    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError>;
}

/// Backend used when no storage is configured.
pub struct DetachedStore;

#[async_trait]
impl AssetStore for DetachedStore {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError> {
        log::info!(
            "Storage backend is 'none'; skipping delete of {} {}",
            asset.resource_type,
            asset.public_id
        );
        Ok(())
    }
}

/// Builds the backend selected by `storage.backend`.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn AssetStore>, StorageError> {
    match config.backend.as_str() {
        "cloudinary" => Ok(Arc::new(cloudinary::CloudinaryStore::new(
            config.cloudinary_cloud_name.clone(),
            config.cloudinary_api_key.clone(),
            config.cloudinary_api_secret.clone(),
        )?)),
        "s3" => Ok(Arc::new(s3::S3Storage::from_config(config)?)),
        "local" => Ok(Arc::new(local::LocalStorage::new(PathBuf::from(
            &config.local_path,
        ))?)),
        "none" | "" => Ok(Arc::new(DetachedStore)),
        other => Err(StorageError::Config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_upload_url() {
        let asset = AssetRef::from_url(
            "https://res.cloudinary.com/demo/image/upload/v1712345678/posters/dune_wide.jpg",
        )
        .unwrap();
        assert_eq!(asset.resource_type, "image");
        assert_eq!(asset.public_id, "posters/dune_wide");
        assert_eq!(asset.path, "posters/dune_wide.jpg");
    }

    #[test]
    fn test_video_resource_type() {
        let asset =
            AssetRef::from_url("https://res.cloudinary.com/demo/video/upload/v1/trailers/dune.mp4")
                .unwrap();
        assert_eq!(asset.resource_type, "video");
        assert_eq!(asset.public_id, "trailers/dune");
    }

    #[test]
    fn test_unversioned_upload_url() {
        let asset =
            AssetRef::from_url("https://res.cloudinary.com/demo/image/upload/folder/a.b.png")
                .unwrap();
        assert_eq!(asset.public_id, "folder/a.b");
    }

    #[test]
    fn test_folder_starting_with_v_is_kept() {
        let asset =
            AssetRef::from_url("https://res.cloudinary.com/demo/image/upload/videos/clip.png")
                .unwrap();
        assert_eq!(asset.public_id, "videos/clip");
    }

    #[test]
    fn test_url_without_upload_segment() {
        let asset = AssetRef::from_url("https://cdn.example.com/static/img/poster.webp").unwrap();
        assert_eq!(asset.resource_type, "image");
        assert_eq!(asset.public_id, "poster");
        assert_eq!(asset.path, "poster.webp");
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(
            AssetRef::from_url("not a url"),
            Err(StorageError::InvalidUrl(_))
        ));
        assert!(matches!(
            AssetRef::from_url("https://cdn.example.com/"),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let config = StorageConfig {
            backend: "ftp".to_string(),
            ..StorageConfig::default()
        };
        assert!(matches!(from_config(&config), Err(StorageError::Config(_))));
    }
}
