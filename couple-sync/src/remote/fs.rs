//! Directory-backed record store.
//!
//! Each record is one JSON document named after its key. Writes go to a
//! hidden temporary file first and are renamed into place, so readers
//! never see a partial record. A shared folder (network mount, synced
//! drive) lets two devices exchange records through this store.

use super::RecordStore;
use crate::error::{SyncError, SyncResult};
use crate::record::RemoteRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Configuration for [`FsRecordStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsRecordStoreConfig {
    /// Folder holding one file per record.
    pub root: PathBuf,
    /// File extension of record files.
    pub extension: String,
}

impl FsRecordStoreConfig {
    /// Config for `root` with the default extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

impl Default for FsRecordStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("couple-records"),
            extension: "json".to_string(),
        }
    }
}

/// Record store on the local filesystem.
pub struct FsRecordStore {
    config: FsRecordStoreConfig,
}

impl FsRecordStore {
    pub fn new(config: FsRecordStoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FsRecordStoreConfig {
        &self.config
    }

    fn path_for(&self, key: &str) -> SyncResult<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SyncError::InvalidRecord {
                key: key.to_string(),
                reason: "record keys must be non-empty and alphanumeric".to_string(),
            });
        }
        Ok(self
            .config
            .root
            .join(format!("{key}.{}", self.config.extension)))
    }

    async fn ensure_root(&self) -> SyncResult<()> {
        if !fs::try_exists(&self.config.root).await? {
            fs::create_dir_all(&self.config.root).await?;
            info!("Created record folder: {:?}", self.config.root);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    fn provider_name(&self) -> &'static str {
        "Directory"
    }

    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>> {
        let path = self.path_for(key)?;
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: RemoteRecord = serde_json::from_slice(&content)?;
        if record.key != key {
            return Err(SyncError::InvalidRecord {
                key: key.to_string(),
                reason: format!("file holds record {}", record.key),
            });
        }
        Ok(Some(record))
    }

    async fn save(&self, record: &RemoteRecord) -> SyncResult<()> {
        let path = self.path_for(&record.key)?;
        self.ensure_root().await?;

        let content = serde_json::to_vec_pretty(record)?;
        let tmp = self
            .config
            .root
            .join(format!(".{}.{}.tmp", record.key, self.config.extension));
        fs::write(&tmp, &content).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote record {} to {:?}", record.key, path);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SyncResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
