//! services/api/src/adapters/storage.rs
//!
//! Local-disk implementation of the `FileStore` port.
//!
//! Uploads land in a `.staging/` subdirectory first and are moved into
//! place with an atomic rename on promotion, matching the two-phase upload
//! contract of the port. Locators are absolute paths under the upload root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docuflow_core::ports::{FileStore, ServiceError, ServiceResult, StagedFile};

const STAGING_DIR: &str = ".staging";

/// A file store that keeps uploaded documents on the local filesystem.
#[derive(Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates the upload root and staging directory if missing.
    pub async fn ensure_layout(&self) -> Result<(), std::io::Error> {
        tokio::fs::create_dir_all(self.root.join(STAGING_DIR)).await
    }

    fn final_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.root.join(STAGING_DIR).join(key)
    }
}

fn map_io_err(e: std::io::Error, what: &str) -> ServiceError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ServiceError::NotFound(format!("{} not found", what)),
        _ => ServiceError::Unexpected(e.to_string()),
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl FileStore for DiskStore {
    async fn stage(&self, key: &str, bytes: &[u8]) -> ServiceResult<StagedFile> {
        let staging = self.staging_path(key);
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(StagedFile {
            staging_locator: path_string(&staging),
            final_locator: path_string(&self.final_path(key)),
        })
    }

    async fn promote(&self, staged: &StagedFile) -> ServiceResult<()> {
        // Same filesystem, so the rename is atomic.
        tokio::fs::rename(&staged.staging_locator, &staged.final_locator)
            .await
            .map_err(|e| map_io_err(e, "staged file"))
    }

    async fn discard(&self, staged: &StagedFile) -> ServiceResult<()> {
        match tokio::fs::remove_file(&staged.staging_locator).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Unexpected(e.to_string())),
        }
    }

    async fn read(&self, locator: &str) -> ServiceResult<Vec<u8>> {
        tokio::fs::read(locator)
            .await
            .map_err(|e| map_io_err(e, "file"))
    }

    async fn delete(&self, locator: &str) -> ServiceResult<()> {
        match tokio::fs::remove_file(locator).await {
            Ok(()) => Ok(()),
            // Already gone: the row outlived the file, nothing to do.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Unexpected(e.to_string())),
        }
    }

    async fn exists(&self, locator: &str) -> ServiceResult<bool> {
        tokio::fs::try_exists(locator)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))
    }
}
