//! In-memory record store.
//!
//! Shared between several engines it stands in for the remote database:
//! every save replaces the whole record, and each call is atomic on its
//! own. Used by tests and for local experiments.

use super::RecordStore;
use crate::error::{SyncError, SyncResult};
use crate::record::RemoteRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Record store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, RemoteRecord>>,
    offline: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Returns a copy of a record without going through the failure switch.
    pub async fn peek(&self, key: &str) -> Option<RemoteRecord> {
        self.records.read().await.get(key).cloned()
    }

    /// Inserts a record directly.
    pub async fn insert(&self, record: RemoteRecord) {
        self.records.write().await.insert(record.key.clone(), record);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_online(&self) -> SyncResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Network("record store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn provider_name(&self) -> &'static str {
        "Memory"
    }

    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>> {
        self.check_online()?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, record: &RemoteRecord) -> SyncResult<()> {
        self.check_online()?;
        self.records
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        debug!("Saved record {} ({} fields)", record.key, record.fields.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> SyncResult<bool> {
        self.check_online()?;
        Ok(self.records.write().await.remove(key).is_some())
    }
}
