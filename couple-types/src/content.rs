//! Shared content: countdown, note and streak.
//!
//! These fields live in the shared record and are overwritten wholesale by
//! whichever device writes last.

use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest countdown label that fits every widget size.
pub const COUNTDOWN_LABEL_MAX_LEN: usize = 12;

/// Longest note text.
pub const NOTE_TEXT_MAX_LEN: usize = 100;

/// Title shown when a countdown has no label.
pub const DEFAULT_COUNTDOWN_TITLE: &str = "Countdown";

/// A value after applying a length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipped {
    pub value: String,
    /// True when characters were removed to fit the limit.
    pub truncated: bool,
}

/// Trims a countdown label and cuts it to [`COUNTDOWN_LABEL_MAX_LEN`].
pub fn clip_countdown_label(raw: &str) -> Clipped {
    let trimmed = raw.trim();
    let value: String = trimmed.chars().take(COUNTDOWN_LABEL_MAX_LEN).collect();
    let truncated = trimmed.chars().count() > COUNTDOWN_LABEL_MAX_LEN;
    Clipped { value, truncated }
}

/// Cuts note text to [`NOTE_TEXT_MAX_LEN`] characters, then trims.
pub fn clip_note_text(raw: &str) -> Clipped {
    let cut: String = raw.chars().take(NOTE_TEXT_MAX_LEN).collect();
    let value = cut.trim().to_string();
    let truncated = value != raw.trim();
    Clipped { value, truncated }
}

/// An optional target instant with an optional short label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub event_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

impl Countdown {
    /// The label when it has content, otherwise [`DEFAULT_COUNTDOWN_TITLE`].
    pub fn display_title(&self) -> &str {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => DEFAULT_COUNTDOWN_TITLE,
        }
    }

    /// Sets the label through [`clip_countdown_label`]. An empty result
    /// clears the label.
    pub fn set_label(&mut self, raw: &str) -> Clipped {
        let clipped = clip_countdown_label(raw);
        self.label = if clipped.value.is_empty() {
            None
        } else {
            Some(clipped.value.clone())
        };
        clipped
    }
}

/// Who wrote a note, relative to the device reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteAuthor {
    Me,
    Partner,
    /// Written by a build that did not record the author.
    #[default]
    Unknown,
}

impl NoteAuthor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Me => "me",
            Self::Partner => "partner",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NoteAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteAuthor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "me" => Ok(Self::Me),
            "partner" => Ok(Self::Partner),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::InvalidNoteAuthor(other.to_string())),
        }
    }
}

/// A short shared message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub author_initials: String,
    pub author: NoteAuthor,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            text: String::new(),
            author_initials: "A".to_string(),
            author: NoteAuthor::Me,
            updated_at: None,
        }
    }
}

impl Note {
    /// Initials to show for the author, using the current initials so
    /// renames are reflected.
    ///
    /// Legacy notes without an author are matched against the current
    /// initials; if neither matches the stored initials are shown.
    pub fn display_author_initials<'a>(
        &'a self,
        me_initials: &'a str,
        partner_initials: &'a str,
    ) -> &'a str {
        match self.author {
            NoteAuthor::Me => me_initials,
            NoteAuthor::Partner => partner_initials,
            NoteAuthor::Unknown if self.author_initials == me_initials => me_initials,
            NoteAuthor::Unknown if self.author_initials == partner_initials => partner_initials,
            NoteAuthor::Unknown => &self.author_initials,
        }
    }
}

/// Consecutive-day note streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub streak_count: u32,
    pub longest_streak: u32,
    pub last_note_at: Option<DateTime<Utc>>,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            streak_count: 1,
            longest_streak: 1,
            last_note_at: None,
        }
    }
}
