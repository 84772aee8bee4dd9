//! Core type definitions for the couple pairing and sync core.
//!
//! This crate defines the plain data shared by every other crate:
//! - Pairing state (`CoupleState`, roles, entitlement)
//! - Profiles and deterministic initials
//! - Shared content: countdown, note, streak
//! - The per-device `Snapshot` persisted by the local store
//! - The opaque `Identity` of a signed-in user
//!
//! Nothing here performs I/O. Length limits are enforced through the
//! explicit `clip_*` functions, which report whether a value was cut.

mod content;
mod couple;
mod ids;
mod profile;
mod snapshot;

pub use content::{
    clip_countdown_label, clip_note_text, Clipped, Countdown, Note, NoteAuthor, Streak,
    COUNTDOWN_LABEL_MAX_LEN, DEFAULT_COUNTDOWN_TITLE, NOTE_TEXT_MAX_LEN,
};
pub use couple::{CoupleRole, CoupleState, Entitlement, PairingStatus};
pub use ids::Identity;
pub use profile::{initials, sanitize_initials, Profile, MAX_INITIALS};
pub use snapshot::Snapshot;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid entitlement: {0}")]
    InvalidEntitlement(String),

    #[error("invalid note author: {0}")]
    InvalidNoteAuthor(String),
}
