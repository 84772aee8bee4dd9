//! The full local state of one device.

use crate::{
    clip_countdown_label, clip_note_text, Countdown, CoupleState, Note, Profile, Streak,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the device persists locally and exchanges with the shared
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub couple: CoupleState,
    pub me: Profile,
    pub partner: Profile,
    pub countdown: Countdown,
    pub note: Note,
    pub streak: Streak,
    /// When the snapshot was last written to the local store.
    pub last_write_at: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            couple: CoupleState::default(),
            me: Profile::default_me(),
            partner: Profile::default_partner(),
            countdown: Countdown::default(),
            note: Note::default(),
            streak: Streak::default(),
            last_write_at: None,
        }
    }
}

impl Snapshot {
    /// Short `"A ↔ B"` label built from both initials.
    pub fn pair_label(&self) -> String {
        format!("{} ↔ {}", self.me.initials, self.partner.initials)
    }

    /// Returns the snapshot in the form it is persisted.
    ///
    /// Profiles go through [`Profile::normalized`], the countdown label and
    /// note text are clipped to their limits, and a blank invite code is
    /// dropped.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.couple.invite_code = self.couple.active_code().map(str::to_string);
        out.me = self.me.normalized();
        out.partner = self.partner.normalized();
        out.countdown.label = self
            .countdown
            .label
            .as_deref()
            .map(|label| clip_countdown_label(label).value)
            .filter(|label| !label.is_empty());
        out.note.text = clip_note_text(&self.note.text).value;
        out
    }
}
