//! Local save folder

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{DeliveryError, DeliveryResult};

/// Writes captures to a local folder
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Creates `dir` recursively and writes `bytes` to `dir/filename`,
    /// replacing any existing file
    ///
    /// Returns the written path.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::LocalSave`] - The folder or file cannot be written
    async fn save(&self, dir: &Path, filename: &str, bytes: &[u8]) -> DeliveryResult<PathBuf>;
}

/// [`LocalStore`] on the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLocalStore;

impl FsLocalStore {
    /// Creates a new store
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocalStore for FsLocalStore {
    async fn save(&self, dir: &Path, filename: &str, bytes: &[u8]) -> DeliveryResult<PathBuf> {
        let path = dir.join(filename);

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DeliveryError::LocalSave {
                path: path.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DeliveryError::LocalSave {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Wrote {} bytes", bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_save_creates_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");

        let path = FsLocalStore::new().save(&dir, "shot.png", b"png").await.unwrap();

        assert_eq!(path, dir.join("shot.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_save_is_idempotent_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = FsLocalStore::new();

        store.save(temp.path(), "shot.png", b"first").await.unwrap();
        let path = store.save(temp.path(), "shot.png", b"second").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_save_into_file_path_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = FsLocalStore::new().save(&blocker, "shot.png", b"png").await;

        match result {
            Err(DeliveryError::LocalSave { path, .. }) => assert_eq!(path, blocker.join("shot.png")),
            other => panic!("Expected LocalSave, got {:?}", other),
        }
    }
}
