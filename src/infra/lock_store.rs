//! File-backed lock store
//!
//! Persists locks to `verlock.lock` as TOML. Every write re-reads the file,
//! applies one upsert, writes a temporary sibling and renames it over the
//! original, all under a single-writer mutex. A crash mid-write leaves the
//! previous file intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::lock::{DependencyLock, LockFile, LockStore, LOCK_FORMAT_VERSION};
use crate::error::LockStoreError;

/// Lock store persisted to a TOML file
#[derive(Debug)]
pub struct FileLockStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    writer: Mutex<()>,
}

impl FileLockStore {
    /// Create a store backed by `path`; the file is created on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<LockFile, LockStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LockFile::new()),
            Err(e) => {
                return Err(LockStoreError::Read {
                    path: self.path.clone(),
                    error: e.to_string(),
                })
            }
        };

        let file = LockFile::from_toml(&content).map_err(|e| LockStoreError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        if file.version > LOCK_FORMAT_VERSION {
            return Err(LockStoreError::UnsupportedFormat {
                path: self.path.clone(),
                version: file.version,
            });
        }
        Ok(file)
    }

    async fn save(&self, file: &LockFile) -> Result<(), LockStoreError> {
        let content = file
            .to_toml()
            .map_err(|e| LockStoreError::Serialize(e.to_string()))?;
        let write_error = |e: std::io::Error| LockStoreError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let temp = self.path.with_extension("lock.tmp");
        tokio::fs::write(&temp, content).await.map_err(write_error)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(write_error)?;
        tracing::debug!("Wrote lock file {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl LockStore for FileLockStore {
    async fn read_all(&self) -> Result<BTreeMap<String, DependencyLock>, LockStoreError> {
        Ok(self.load().await?.locks())
    }

    async fn write(&self, lock: &DependencyLock) -> Result<(), LockStoreError> {
        let _guard = self.writer.lock().await;
        let mut file = self.load().await?;
        file.version = LOCK_FORMAT_VERSION;
        file.upsert(lock);
        self.save(&file).await
    }

    async fn remove(&self, name: &str) -> Result<bool, LockStoreError> {
        let _guard = self.writer.lock().await;
        let mut file = self.load().await?;
        if !file.remove(name) {
            return Ok(false);
        }
        self.save(&file).await?;
        Ok(true)
    }
}
