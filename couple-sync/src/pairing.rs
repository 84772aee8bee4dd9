//! Pairing state machine.
//!
//! Pure transitions on [`CoupleState`]: no I/O, no clock. Every function
//! takes the current state and returns the next one, leaving the rest of
//! the snapshot to the caller.
//!
//! ```text
//!              create                    redeem (match / blind)
//!   unpaired ──────────▶ owner-paired    unpaired ──────────▶ partner-paired
//!      ▲                   │ regenerate                          │ redeem (other code)
//!      │      unlink       ▼                                     ▼
//!      └────────────── any state ◀───────────────────── code switch
//! ```

use crate::invite;
use couple_types::{CoupleRole, CoupleState, Entitlement, PairingStatus};
use rand::Rng;

/// Why a redeem left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty after trimming.
    EmptyCode,
    /// The owner entered the code they already own.
    OwnCode,
    /// Already paired under a different code, and not as partner.
    CodeMismatch,
}

/// Which branch a redeem takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemTransition {
    /// No change.
    Ignored(IgnoreReason),
    /// A paired partner switches to the owner's new code.
    SwitchCode,
    /// Become partner-paired. `blind` when no code was stored before.
    Join { blind: bool },
}

/// Starts a new pairing as owner with a fresh code.
pub fn create<R: Rng + ?Sized>(_state: &CoupleState, rng: &mut R) -> CoupleState {
    CoupleState {
        role: CoupleRole::Owner,
        entitlement: Entitlement::Unlocked,
        paired: true,
        invite_code: Some(invite::generate(rng)),
    }
}

/// Replaces the owner's code. Unchanged unless owner-paired and unlocked.
///
/// The record under the old code is left to the caller to delete.
pub fn regenerate<R: Rng + ?Sized>(state: &CoupleState, rng: &mut R) -> CoupleState {
    if !can_regenerate(state) {
        return state.clone();
    }
    CoupleState {
        invite_code: Some(invite::generate(rng)),
        ..state.clone()
    }
}

/// Returns true if [`regenerate`] would issue a new code.
pub fn can_regenerate(state: &CoupleState) -> bool {
    state.status() == PairingStatus::OwnerPaired && state.is_unlocked()
}

/// Decides which redeem branch applies to `input`.
pub fn plan_redeem(state: &CoupleState, input: &str) -> RedeemTransition {
    let code = invite::normalize(input);
    if code.is_empty() {
        return RedeemTransition::Ignored(IgnoreReason::EmptyCode);
    }

    let current = state.active_code().map(invite::normalize);
    let matches = current.as_deref() == Some(code.as_str());

    if state.role == CoupleRole::Owner && matches {
        return RedeemTransition::Ignored(IgnoreReason::OwnCode);
    }
    if state.status() == PairingStatus::PartnerPaired && current.is_some() && !matches {
        return RedeemTransition::SwitchCode;
    }
    match current {
        None => RedeemTransition::Join { blind: true },
        Some(_) if matches => RedeemTransition::Join { blind: false },
        Some(_) => RedeemTransition::Ignored(IgnoreReason::CodeMismatch),
    }
}

/// Applies a redeem of `input` and returns the next state.
pub fn redeem(state: &CoupleState, input: &str) -> CoupleState {
    let code = invite::normalize(input);
    match plan_redeem(state, input) {
        RedeemTransition::Ignored(_) => state.clone(),
        RedeemTransition::SwitchCode => CoupleState {
            invite_code: Some(code),
            ..state.clone()
        },
        RedeemTransition::Join { blind } => CoupleState {
            role: CoupleRole::Partner,
            entitlement: Entitlement::Unlocked,
            paired: true,
            invite_code: if blind {
                Some(code)
            } else {
                state.invite_code.clone()
            },
        },
    }
}

/// Leaves the pairing. Always succeeds.
pub fn unlink(_state: &CoupleState) -> CoupleState {
    CoupleState {
        role: CoupleRole::None,
        entitlement: Entitlement::Unlocked,
        paired: false,
        invite_code: None,
    }
}
