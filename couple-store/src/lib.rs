//! Local state store for the couple sync core.
//!
//! The store holds the authoritative local [`Snapshot`] of one device plus
//! the pending-delete marker used to retry removal of an orphaned shared
//! record. Reads never fail: an uninitialized or unreadable store yields
//! defaults. Writes are durable before they return.
//!
//! Next to the snapshot the store persists a few derived display values
//! (distance, pair label, countdown text) so the widget layer can render
//! without recomputing anything.

mod error;
pub mod keys;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStateStore;

use chrono::{DateTime, Utc};
use couple_types::Snapshot;

/// Display values persisted at write time for the widget layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCache {
    /// Kilometres between both labelled locations, `0` when unknown.
    pub distance_km: u32,
    pub distance_label: String,
    pub countdown_display: String,
}

/// Durable process-local snapshot storage.
///
/// Implementations serialize their own access; callers still route every
/// mutation through a single writer so local edits never interleave.
pub trait LocalStateStore: Send + Sync {
    /// Reads the current snapshot, or defaults when nothing usable is stored.
    fn read(&self) -> Snapshot;

    /// Persists `snapshot`, stamping it with `now`.
    fn write(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> StoreResult<()>;

    /// Sets or clears the invite code whose shared record still has to be
    /// deleted.
    fn set_pending_delete(&self, code: Option<&str>) -> StoreResult<()>;

    /// Returns the pending-delete invite code, if any.
    fn pending_delete(&self) -> Option<String>;

    /// Returns the derived display values from the last write.
    fn display_cache(&self) -> Option<DisplayCache>;
}
