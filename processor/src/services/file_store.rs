//! Real file-backed record store
//!
//! Collections are stored as pretty-printed JSON arrays. Saves go through a
//! temporary sibling file and a rename so readers never see a partial file.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use shared::Collection;

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// Real file system implementation
#[derive(Debug, Clone, Default)]
pub struct RealFileStore {
    /// Base directory for relative paths
    base_dir: Option<PathBuf>,
}

impl RealFileStore {
    /// Create a store resolving relative paths against the working directory
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Create with custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir: Some(base_dir),
        }
    }

    /// Resolve a path against the base directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for RealFileStore {
    async fn load(&self, path: &Path) -> StoreResult<Collection> {
        let path = self.resolve(path);

        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let collection = Collection::from_value(value).map_err(|e| StoreError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), records = collection.len(), "Loaded collection");
        Ok(collection)
    }

    async fn save(&self, path: &Path, collection: &Collection) -> StoreResult<()> {
        let path = self.resolve(path);

        let content =
            serde_json::to_string_pretty(collection).map_err(|source| StoreError::Serialize {
                path: path.clone(),
                source,
            })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp = Self::temp_path(&path);
        let written = async {
            fs::write(&temp, content).await?;
            fs::rename(&temp, &path).await
        }
        .await;

        // Either step may leave the temp file behind
        if let Err(source) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Write { path, source });
        }

        tracing::debug!(path = %path.display(), records = collection.len(), "Saved collection");
        Ok(())
    }
}
