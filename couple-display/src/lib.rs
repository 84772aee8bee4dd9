//! Display values derived from a [`Snapshot`].
//!
//! The widget layer never recomputes anything itself: the local store
//! persists the values produced here next to the snapshot, and the app
//! renders [`DisplayState`] directly.

mod countdown;
mod distance;

pub use countdown::{countdown_text, NO_EVENT_TEXT};
pub use distance::{distance_km, haversine_km, Coordinates, EARTH_RADIUS_KM};

use chrono::{DateTime, Utc};
use couple_types::Snapshot;
use serde::{Deserialize, Serialize};

/// Everything a widget needs to render, computed at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub pair_label: String,
    /// Rounded kilometres between both labelled locations.
    pub distance_km: Option<u32>,
    pub countdown_title: String,
    pub countdown_text: String,
    pub note_text: String,
    pub note_author_initials: String,
    pub streak_count: u32,
    pub longest_streak: u32,
}

impl DisplayState {
    /// Derives the display values for `snapshot` as of `now`.
    pub fn from_snapshot(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        Self {
            pair_label: snapshot.pair_label(),
            distance_km: distance_km(&snapshot.me, &snapshot.partner),
            countdown_title: snapshot.countdown.display_title().to_string(),
            countdown_text: countdown_text(snapshot.countdown.event_at, now),
            note_text: snapshot.note.text.clone(),
            note_author_initials: snapshot
                .note
                .display_author_initials(&snapshot.me.initials, &snapshot.partner.initials)
                .to_string(),
            streak_count: snapshot.streak.streak_count,
            longest_streak: snapshot.streak.longest_streak,
        }
    }
}
