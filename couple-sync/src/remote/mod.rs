//! Remote record stores.
//!
//! A [`RecordStore`] offers single-record fetch, save and delete by key.
//! There are no cross-record transactions; a save replaces the whole
//! record.

pub mod fs;
pub mod memory;

use crate::error::SyncResult;
use crate::record::RemoteRecord;
use async_trait::async_trait;

pub use fs::{FsRecordStore, FsRecordStoreConfig};
pub use memory::MemoryRecordStore;

/// Abstract shared-record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the name of the backing provider.
    fn provider_name(&self) -> &'static str;

    /// Fetches a record. `Ok(None)` means it does not exist.
    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>>;

    /// Creates or replaces a record.
    async fn save(&self, record: &RemoteRecord) -> SyncResult<()>;

    /// Deletes a record. Returns `false` if it did not exist.
    async fn delete(&self, key: &str) -> SyncResult<bool>;
}
