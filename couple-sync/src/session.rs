//! Per-device session: the single writer of local state.
//!
//! A [`CoupleSession`] owns the in-memory snapshot of one device. Every
//! local change goes through [`CoupleSession::commit`], which applies the
//! mutation, persists it and signals the display layer. Remote work
//! (push, pull, record deletion, slot release) runs after the commit; the
//! snapshot lock is never held across an `.await`.

use crate::display::{DisplayRefresh, NoopRefresh};
use crate::engine::{PushOutcome, SyncEngine};
use crate::error::SyncResult;
use crate::identity::IdentityProvider;
use crate::invite;
use crate::pairing::{self, RedeemTransition};
use crate::streak;
use crate::subscription::{ChangeSubscriptions, NoopSubscriptions};
use chrono::{DateTime, Utc};
use couple_store::LocalStateStore;
use couple_types::{
    clip_countdown_label, clip_note_text, sanitize_initials, Clipped, CoupleRole, NoteAuthor,
    PairingStatus, Snapshot,
};
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Fallback initials for this device's user.
const MY_FALLBACK_INITIALS: &str = "A";
/// Fallback initials for the partner.
const PARTNER_FALLBACK_INITIALS: &str = "B";

/// Outcome of redeeming an invite code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemReport {
    /// The input was empty. Nothing changed.
    EmptyCode,
    /// Nobody is signed in, so the partner slot cannot be claimed.
    SignInRequired,
    /// The code belongs to another partner. The local redeem was undone.
    CodeAlreadyClaimed,
    /// The local redeem was kept but the claim could not be written.
    SyncFailed,
    /// Partner-paired under the code, with the shared record pulled.
    Joined,
    /// The redeem did not change the pairing.
    Unchanged,
}

/// What happened when the app came to the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundReport {
    pub push: PushOutcome,
    /// A newer shared record was merged.
    pub pulled: bool,
    /// No record deletion is pending any more.
    pub pending_delete_cleared: bool,
}

/// Sequences local commits with remote sync for one device.
pub struct CoupleSession {
    store: Arc<dyn LocalStateStore>,
    engine: SyncEngine,
    identity: Arc<dyn IdentityProvider>,
    subscriptions: Arc<dyn ChangeSubscriptions>,
    display: Arc<dyn DisplayRefresh>,
    snapshot: Mutex<Snapshot>,
}

impl CoupleSession {
    /// Creates a session and loads the stored snapshot.
    pub fn new(
        store: Arc<dyn LocalStateStore>,
        engine: SyncEngine,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let snapshot = store.read();
        Self {
            store,
            engine,
            identity,
            subscriptions: Arc::new(NoopSubscriptions),
            display: Arc::new(NoopRefresh),
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Uses `subscriptions` for change-notification registration.
    pub fn with_subscriptions(mut self, subscriptions: Arc<dyn ChangeSubscriptions>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Uses `display` for refresh signals.
    pub fn with_display(mut self, display: Arc<dyn DisplayRefresh>) -> Self {
        self.display = display;
        self
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Replaces the in-memory snapshot with what the store holds.
    pub fn refresh_from_store(&self) {
        *self.lock() = self.store.read();
    }

    /// Applies `mutate`, persists the result and signals a refresh.
    ///
    /// The in-memory snapshot only changes once the write succeeded, and
    /// holds the same normalized values as the store.
    pub fn commit<F>(&self, mutate: F) -> SyncResult<Snapshot>
    where
        F: FnOnce(&mut Snapshot),
    {
        self.commit_at(Utc::now(), mutate)
    }

    /// [`commit`](Self::commit) with an explicit write time.
    pub fn commit_at<F>(&self, now: DateTime<Utc>, mutate: F) -> SyncResult<Snapshot>
    where
        F: FnOnce(&mut Snapshot),
    {
        let updated = {
            let mut guard = self.lock();
            let mut draft = guard.clone();
            mutate(&mut draft);
            let mut updated = draft.normalized();
            self.store.write(&updated, now)?;
            updated.last_write_at = Some(now);
            *guard = updated.clone();
            updated
        };
        self.display.refresh();
        Ok(updated)
    }

    // ── Pairing ──────────────────────────────────────────────────

    /// Starts a new pairing as owner with a fresh invite code.
    pub async fn create_pairing<R: Rng + ?Sized>(&self, rng: &mut R) -> SyncResult<String> {
        let updated = self.commit(|snap| snap.couple = pairing::create(&snap.couple, rng))?;
        let code = updated.couple.invite_code.unwrap_or_default();
        info!("Created pairing with code {code}");
        self.resubscribe().await;
        Ok(code)
    }

    /// Issues a new code for an owner-paired device and deletes the record
    /// of the old one.
    ///
    /// Returns the new code, or `None` when the device may not regenerate.
    /// The old code is marked for deletion before the new one is committed;
    /// a failed deletion stays pending and is retried on foreground.
    pub async fn regenerate_invite_code<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> SyncResult<Option<String>> {
        let current = self.snapshot();
        if !pairing::can_regenerate(&current.couple) {
            debug!("Regenerate ignored: not an unlocked paired owner");
            return Ok(None);
        }
        let old_code = current.couple.active_code().map(str::to_string);
        if let Some(old) = &old_code {
            self.store.set_pending_delete(Some(old))?;
        }

        let updated =
            match self.commit(|snap| snap.couple = pairing::regenerate(&snap.couple, rng)) {
                Ok(updated) => updated,
                Err(e) => {
                    if old_code.is_some() {
                        if let Err(clear) = self.store.set_pending_delete(None) {
                            warn!("Failed to clear pending delete marker: {clear}");
                        }
                    }
                    return Err(e);
                }
            };
        let new_code = updated.couple.invite_code.clone().unwrap_or_default();
        info!("Regenerated invite code");

        if let Some(old) = old_code {
            if old == new_code || self.engine.delete_record_if_exists(&old).await {
                self.store.set_pending_delete(None)?;
            } else {
                warn!("Old record stays pending for deletion");
            }
        }

        self.resubscribe().await;
        Ok(Some(new_code))
    }

    /// Retries deleting the record of a replaced code.
    ///
    /// Returns `true` when nothing is pending any more.
    pub async fn retry_pending_delete(&self) -> SyncResult<bool> {
        let Some(code) = self.store.pending_delete() else {
            return Ok(true);
        };
        if !self.engine.delete_record_if_exists(&code).await {
            debug!("Pending record deletion failed again");
            return Ok(false);
        }
        self.store.set_pending_delete(None)?;
        info!("Pending record deletion completed");
        Ok(true)
    }

    /// Redeems an invite code and claims the partner slot.
    ///
    /// A code already claimed by another identity undoes the local redeem
    /// with an unlink.
    pub async fn redeem_invite_code(&self, input: &str) -> SyncResult<RedeemReport> {
        if invite::normalize(input).is_empty() {
            return Ok(RedeemReport::EmptyCode);
        }
        if self.identity.current_identity().is_none() {
            return Ok(RedeemReport::SignInRequired);
        }
        if !invite::is_well_formed(input) {
            warn!("Redeeming a code that does not look like XXXX-XXXX");
        }

        let transition = pairing::plan_redeem(&self.snapshot().couple, input);
        debug!("Redeem transition: {transition:?}");
        if !matches!(transition, RedeemTransition::Ignored(_)) {
            self.commit(|snap| snap.couple = pairing::redeem(&snap.couple, input))?;
        }

        match self.sync_push().await {
            PushOutcome::PartnerSlotAlreadyTaken => {
                info!("Invite code is claimed by another partner, unlinking");
                self.unlink().await?;
                Ok(RedeemReport::CodeAlreadyClaimed)
            }
            PushOutcome::SaveFailed => Ok(RedeemReport::SyncFailed),
            PushOutcome::Success => {
                if self.snapshot().couple.status() != PairingStatus::PartnerPaired {
                    return Ok(RedeemReport::Unchanged);
                }
                self.sync_pull().await?;
                self.resubscribe().await;
                Ok(RedeemReport::Joined)
            }
        }
    }

    /// Leaves the pairing. A partner also releases its slot in the shared
    /// record so the code can be redeemed again.
    pub async fn unlink(&self) -> SyncResult<()> {
        let before = self.snapshot().couple;
        let identity = self.identity.current_identity();

        self.commit(|snap| snap.couple = pairing::unlink(&snap.couple))?;
        info!("Unlinked");

        if before.role == CoupleRole::Partner {
            if let (Some(code), Some(identity)) = (before.active_code(), identity.as_ref()) {
                self.engine.release_partner_slot(code, identity).await;
            }
        }
        if let Err(e) = self.subscriptions.subscribe(None).await {
            warn!("Failed to remove change subscription: {e}");
        }
        Ok(())
    }

    // ── Profiles ─────────────────────────────────────────────────

    /// Renames this device's user and recomputes the initials.
    pub fn update_my_name(&self, name: &str) -> SyncResult<()> {
        self.commit(|snap| snap.me.set_name(name, MY_FALLBACK_INITIALS))?;
        Ok(())
    }

    /// Renames the partner and recomputes the initials.
    pub fn update_partner_name(&self, name: &str) -> SyncResult<()> {
        self.commit(|snap| snap.partner.set_name(name, PARTNER_FALLBACK_INITIALS))?;
        Ok(())
    }

    /// Sets this device's location. Label and country are trimmed; blank
    /// values are dropped.
    pub fn set_my_location(
        &self,
        city_label: Option<&str>,
        country: Option<&str>,
        coordinates: Option<(f64, f64)>,
    ) -> SyncResult<()> {
        self.commit(|snap| {
            snap.me.set_location(trimmed(city_label), trimmed(country), coordinates);
        })?;
        Ok(())
    }

    /// Sets the partner's location.
    pub fn set_partner_location(
        &self,
        city_label: Option<&str>,
        country: Option<&str>,
        coordinates: Option<(f64, f64)>,
    ) -> SyncResult<()> {
        self.commit(|snap| {
            snap.partner.set_location(trimmed(city_label), trimmed(country), coordinates);
        })?;
        Ok(())
    }

    /// Removes both locations.
    pub fn clear_locations(&self) -> SyncResult<()> {
        self.commit(|snap| {
            snap.me.clear_location();
            snap.partner.clear_location();
        })?;
        Ok(())
    }

    // ── Shared content ───────────────────────────────────────────

    /// Sets the countdown target. A given label replaces the current one
    /// after clipping; `None` keeps it.
    pub fn set_countdown(
        &self,
        event_at: Option<DateTime<Utc>>,
        label: Option<&str>,
    ) -> SyncResult<Option<Clipped>> {
        let clipped = label.map(clip_countdown_label);
        self.commit(|snap| {
            snap.countdown.event_at = event_at;
            if let Some(clipped) = &clipped {
                snap.countdown.label =
                    (!clipped.value.is_empty()).then(|| clipped.value.clone());
            }
        })?;
        Ok(clipped)
    }

    /// Clears the countdown.
    pub fn reset_countdown(&self) -> SyncResult<()> {
        self.commit(|snap| {
            snap.countdown.event_at = None;
            snap.countdown.label = None;
        })?;
        Ok(())
    }

    /// Saves a note written at `now` and advances the streak.
    pub fn save_note(
        &self,
        text: &str,
        author_initials: &str,
        author: NoteAuthor,
        now: DateTime<Utc>,
    ) -> SyncResult<Clipped> {
        let clipped = clip_note_text(text);
        self.commit_at(now, |snap| {
            snap.note.text = clipped.value.clone();
            snap.note.author_initials = sanitize_initials(author_initials, &snap.me.initials);
            snap.note.author = author;
            snap.note.updated_at = Some(now);
            snap.streak = streak::apply_note_update(&snap.streak, now);
        })?;
        Ok(clipped)
    }

    /// Replaces the note with an empty one written by this device.
    pub fn reset_note(&self, now: DateTime<Utc>) -> SyncResult<()> {
        let initials = self.snapshot().me.initials;
        self.save_note("", &initials, NoteAuthor::Me, now)?;
        Ok(())
    }

    // ── Sync ─────────────────────────────────────────────────────

    /// Pushes the current snapshot.
    pub async fn sync_push(&self) -> PushOutcome {
        let snapshot = self.snapshot();
        let identity = self.identity.current_identity();
        self.engine.push(&snapshot, identity.as_ref()).await
    }

    /// Pulls the shared record and merges it into local state.
    ///
    /// Returns `true` when a merged snapshot was written. A pull is dropped
    /// if the pairing changed locally while it was in flight.
    pub async fn sync_pull(&self) -> SyncResult<bool> {
        let current = self.snapshot();
        if current.couple.status() == PairingStatus::Unpaired
            || current.couple.active_code().is_none()
        {
            return Ok(false);
        }
        let identity = self.identity.current_identity();
        let Some(pulled) = self
            .engine
            .pull(current.couple.role, &current, identity.as_ref())
            .await
        else {
            return Ok(false);
        };
        let mut updated = pulled.normalized();

        let now = Utc::now();
        {
            let mut guard = self.lock();
            if guard.couple != current.couple {
                debug!("Dropping pull: pairing changed while it was in flight");
                return Ok(false);
            }
            self.store.write(&updated, now)?;
            updated.last_write_at = Some(now);
            *guard = updated;
        }
        self.display.refresh();
        debug!("Merged shared record into local state");
        Ok(true)
    }

    /// Subscribes to changes of the active code's record, or removes the
    /// subscription when unpaired.
    pub async fn resubscribe(&self) {
        let couple = self.snapshot().couple;
        let code = if couple.paired { couple.active_code() } else { None };
        if let Err(e) = self.subscriptions.subscribe(code).await {
            warn!("Failed to update change subscription: {e}");
        }
    }

    /// Runs the foreground sequence: reload, push, pull, then retry a
    /// pending record deletion.
    pub async fn on_foreground(&self) -> SyncResult<ForegroundReport> {
        self.refresh_from_store();
        let push = self.sync_push().await;
        if push == PushOutcome::SaveFailed {
            warn!("Foreground push failed");
        }
        let pulled = self.sync_pull().await?;
        let pending_delete_cleared = self.retry_pending_delete().await?;
        Ok(ForegroundReport {
            push,
            pulled,
            pending_delete_cleared,
        })
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
