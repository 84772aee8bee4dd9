//! Sync engine: reconciles a local snapshot with the shared record.
//!
//! The engine owns no local state. It is handed a snapshot and an identity,
//! talks to a [`RecordStore`], and reports the outcome. Remote operations
//! are skipped, not failed, whenever the pairing is not in a syncable state
//! or nobody is signed in.
//!
//! Only the claim fields are protected against races: a partner never
//! overwrites a `partnerAppleId` that belongs to someone else. Shared
//! content is last-write-wins.

use crate::invite;
use crate::record::{self, fields, FieldValue, RemoteRecord};
use crate::remote::RecordStore;
use couple_types::{CoupleRole, CoupleState, Identity, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Record type stamped on created records.
    pub record_type: String,
    /// Prefix of change-subscription ids.
    pub subscription_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            record_type: "Couple".to_string(),
            subscription_prefix: "couple-".to_string(),
        }
    }
}

/// Result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Written, or nothing to write.
    Success,
    /// The partner slot belongs to a different identity. Nothing was written.
    PartnerSlotAlreadyTaken,
    /// The record could not be fetched or saved.
    SaveFailed,
}

/// Pushes and pulls snapshots through a [`RecordStore`].
pub struct SyncEngine {
    store: Arc<dyn RecordStore>,
    config: SyncConfig,
}

impl SyncEngine {
    /// Creates an engine on top of `store`.
    pub fn new(store: Arc<dyn RecordStore>, config: SyncConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the backing store's provider name.
    pub fn provider_name(&self) -> &'static str {
        self.store.provider_name()
    }

    // ── Push ─────────────────────────────────────────────────────

    /// Writes `snapshot` to the shared record for its invite code.
    pub async fn push(&self, snapshot: &Snapshot, identity: Option<&Identity>) -> PushOutcome {
        let Some((key, identity)) = sync_target(&snapshot.couple, identity) else {
            debug!("Push skipped: pairing not syncable or signed out");
            return PushOutcome::Success;
        };
        let role = snapshot.couple.role;

        let existing = match self.store.fetch(&key).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Push of {key} failed to fetch: {e}");
                return PushOutcome::SaveFailed;
            }
        };

        let mut record = match (role, existing) {
            (CoupleRole::Partner, Some(existing)) => {
                match existing.get_str(fields::PARTNER_APPLE_ID) {
                    Some(claimed) if claimed != identity.as_str() => {
                        info!("Partner slot of {key} is already claimed");
                        return PushOutcome::PartnerSlotAlreadyTaken;
                    }
                    _ => existing,
                }
            }
            (_, Some(existing)) => existing,
            (_, None) => {
                debug!("Creating record {key} as {role}");
                RemoteRecord::new(&key, &self.config.record_type)
            }
        };

        let claim = match role {
            CoupleRole::Partner => fields::PARTNER_APPLE_ID,
            _ => fields::OWNER_APPLE_ID,
        };
        record.set(claim, Some(FieldValue::from(identity.as_str())));
        record.apply(record::build_record_fields(snapshot, role));

        match self.store.save(&record).await {
            Ok(()) => {
                debug!("Pushed {key} as {role}");
                PushOutcome::Success
            }
            Err(e) => {
                warn!("Push of {key} failed to save: {e}");
                PushOutcome::SaveFailed
            }
        }
    }

    // ── Pull ─────────────────────────────────────────────────────

    /// Reads the shared record and merges it into `current`.
    ///
    /// Returns `None` when the pairing is not syncable, nobody is signed in,
    /// the record does not exist, the identity is not a member of the
    /// record, or the store fails.
    pub async fn pull(
        &self,
        role: CoupleRole,
        current: &Snapshot,
        identity: Option<&Identity>,
    ) -> Option<Snapshot> {
        if role != current.couple.role {
            debug!("Pull as {role} for a snapshot with role {}", current.couple.role);
        }
        let gate = CoupleState {
            role,
            ..current.couple.clone()
        };
        let (key, identity) = sync_target(&gate, identity)?;

        let record = match self.store.fetch(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Pull: no record for {key}");
                return None;
            }
            Err(e) => {
                warn!("Pull of {key} failed: {e}");
                return None;
            }
        };

        let id = Some(identity.as_str());
        let is_member = record.get_str(fields::OWNER_APPLE_ID) == id
            || record.get_str(fields::PARTNER_APPLE_ID) == id;
        if !is_member {
            warn!("Pull of {key} refused: identity is not a member of the record");
            return None;
        }

        Some(record::snapshot_from_record(&record, role, current))
    }

    // ── Record lifecycle ─────────────────────────────────────────

    /// Deletes the record for `code`. Missing records count as deleted.
    /// Returns `false` only when the store failed.
    pub async fn delete_record_if_exists(&self, code: &str) -> bool {
        let key = invite::record_key(code);
        if key.is_empty() {
            return true;
        }
        match self.store.delete(&key).await {
            Ok(existed) => {
                debug!("Deleted record {key} (existed: {existed})");
                true
            }
            Err(e) => {
                warn!("Delete of {key} failed: {e}");
                false
            }
        }
    }

    /// Frees the partner slot of `code` if it is still held by `identity`.
    ///
    /// Best effort: failures are logged only.
    pub async fn release_partner_slot(&self, code: &str, identity: &Identity) {
        let key = invite::record_key(code);
        if key.is_empty() || identity.is_empty() {
            return;
        }

        let mut record = match self.store.fetch(&key).await {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                warn!("Release of {key} failed to fetch: {e}");
                return;
            }
        };
        if record.get_str(fields::PARTNER_APPLE_ID) != Some(identity.as_str()) {
            debug!("Release of {key} skipped: slot held by someone else");
            return;
        }

        record.apply(record::partner_release_fields());
        match self.store.save(&record).await {
            Ok(()) => info!("Released partner slot of {key}"),
            Err(e) => warn!("Release of {key} failed to save: {e}"),
        }
    }
}

/// Record key and identity when `couple` may talk to the shared record.
fn sync_target<'a>(
    couple: &CoupleState,
    identity: Option<&'a Identity>,
) -> Option<(String, &'a Identity)> {
    if !couple.can_sync() {
        return None;
    }
    let identity = identity.filter(|id| !id.is_empty())?;
    let key = invite::record_key(couple.active_code()?);
    if key.is_empty() {
        return None;
    }
    Some((key, identity))
}
