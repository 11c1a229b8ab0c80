//! Local filesystem storage backend.

use super::{AssetRef, AssetStore, StorageError};
use async_trait::async_trait;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Base path for file storage
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    /// Full path for an asset. Keys that would leave the base directory are
    /// refused.
    fn get_file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if key.is_empty() || escapes {
            return Err(StorageError::InvalidUrl(format!(
                "refusing storage key '{}'",
                key
            )));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), StorageError> {
        let path = self.get_file_path(&asset.path)?;
        log::info!("LocalStorage: delete {:?}", path);

        actix_web::web::block(move || fs::remove_file(path))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e.to_string())))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(path: &str) -> AssetRef {
        AssetRef {
            resource_type: "image".to_string(),
            public_id: path.rsplit_once('.').map_or(path, |(id, _)| id).to_string(),
            path: path.to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_delete_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        fs::create_dir_all(dir.path().join("posters")).unwrap();
        fs::write(dir.path().join("posters/dune.jpg"), b"jpeg").unwrap();

        storage.delete(&asset("posters/dune.jpg")).await.unwrap();
        assert!(!dir.path().join("posters/dune.jpg").exists());
    }

    #[actix_rt::test]
    async fn test_delete_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        let result = storage.delete(&asset("missing.jpg")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_traversal_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        assert!(storage.get_file_path("../etc/passwd").is_err());
        assert!(storage.get_file_path("/etc/passwd").is_err());
        assert!(storage.get_file_path("a/b.png").is_ok());
    }
}
