//! The shared remote record and its mapping to and from a [`Snapshot`].
//!
//! A record is a flat map of primitive fields. Profiles are stored twice,
//! under an `owner` and a `partner` prefix; which local profile lands under
//! which prefix depends on the writer's role. Countdown, note and streak
//! are shared and overwritten by whoever writes last.

use chrono::{DateTime, Utc};
use couple_types::{
    Countdown, CoupleRole, Note, NoteAuthor, Profile, Snapshot, Streak,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names of the shared record.
pub mod fields {
    pub const OWNER_APPLE_ID: &str = "ownerAppleId";
    pub const PARTNER_APPLE_ID: &str = "partnerAppleId";
    pub const INVITE_CODE: &str = "inviteCode";

    pub const OWNER_NAME: &str = "ownerName";
    pub const OWNER_INITIALS: &str = "ownerInitials";
    pub const OWNER_CITY_LABEL: &str = "ownerCityLabel";
    pub const OWNER_COUNTRY: &str = "ownerCountry";
    pub const OWNER_LAT: &str = "ownerLat";
    pub const OWNER_LON: &str = "ownerLon";

    pub const PARTNER_NAME: &str = "partnerName";
    pub const PARTNER_INITIALS: &str = "partnerInitials";
    pub const PARTNER_CITY_LABEL: &str = "partnerCityLabel";
    pub const PARTNER_COUNTRY: &str = "partnerCountry";
    pub const PARTNER_LAT: &str = "partnerLat";
    pub const PARTNER_LON: &str = "partnerLon";

    pub const EVENT_AT: &str = "eventAtUTC";
    pub const COUNTDOWN_LABEL: &str = "countdownLabel";
    pub const NOTE_TEXT: &str = "noteText";
    pub const NOTE_AUTHOR_INITIALS: &str = "noteAuthorInitials";
    pub const NOTE_AUTHOR_ROLE: &str = "noteAuthorRole";
    pub const NOTE_UPDATED_AT: &str = "noteUpdatedAt";
    pub const STREAK_COUNT: &str = "streakCount";
    pub const LONGEST_STREAK: &str = "longestStreak";
    pub const LAST_NOTE_AT: &str = "lastNoteAt";
}

/// Initials shown for a remote profile or note that carries none.
pub const UNKNOWN_INITIALS: &str = "?";

/// A primitive field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    String(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Field changes to apply in one save. `None` removes the field.
pub type FieldSet = BTreeMap<&'static str, Option<FieldValue>>;

/// One shared record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Record key derived from the invite code.
    pub key: String,
    pub record_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl RemoteRecord {
    /// Creates an empty record.
    pub fn new(key: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            record_type: record_type.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns a string field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns a numeric field as `f64`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Double(v)) => Some(*v),
            Some(FieldValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns an integer field.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Sets or removes one field.
    pub fn set(&mut self, name: &str, value: Option<FieldValue>) {
        match value {
            Some(value) => {
                self.fields.insert(name.to_string(), value);
            }
            None => {
                self.fields.remove(name);
            }
        }
    }

    /// Applies every change in `set`.
    pub fn apply(&mut self, set: FieldSet) {
        for (name, value) in set {
            self.set(name, value);
        }
    }
}

// ── Snapshot → record ────────────────────────────────────────────

struct ProfileFields {
    name: &'static str,
    initials: &'static str,
    city_label: &'static str,
    country: &'static str,
    lat: &'static str,
    lon: &'static str,
}

const OWNER: ProfileFields = ProfileFields {
    name: fields::OWNER_NAME,
    initials: fields::OWNER_INITIALS,
    city_label: fields::OWNER_CITY_LABEL,
    country: fields::OWNER_COUNTRY,
    lat: fields::OWNER_LAT,
    lon: fields::OWNER_LON,
};

const PARTNER: ProfileFields = ProfileFields {
    name: fields::PARTNER_NAME,
    initials: fields::PARTNER_INITIALS,
    city_label: fields::PARTNER_CITY_LABEL,
    country: fields::PARTNER_COUNTRY,
    lat: fields::PARTNER_LAT,
    lon: fields::PARTNER_LON,
};

/// Builds the complete field set a device with `role` writes for
/// `snapshot`.
///
/// Owner and partner profiles are swapped for the partner role. The
/// claim fields (`ownerAppleId`, `partnerAppleId`) are not included.
pub fn build_record_fields(snapshot: &Snapshot, role: CoupleRole) -> FieldSet {
    let snapshot = &snapshot.normalized();
    let mut set = FieldSet::new();

    let code = snapshot
        .couple
        .active_code()
        .map(crate::invite::normalize);
    set.insert(fields::INVITE_CODE, code.map(FieldValue::from));

    let (owner, partner) = match role {
        CoupleRole::Partner => (&snapshot.partner, &snapshot.me),
        CoupleRole::Owner | CoupleRole::None => (&snapshot.me, &snapshot.partner),
    };
    insert_profile(&mut set, &OWNER, owner);
    insert_profile(&mut set, &PARTNER, partner);

    let countdown = &snapshot.countdown;
    set.insert(fields::EVENT_AT, countdown.event_at.map(epoch_secs));
    set.insert(
        fields::COUNTDOWN_LABEL,
        countdown.label.clone().map(FieldValue::from),
    );

    let note = &snapshot.note;
    set.insert(fields::NOTE_TEXT, Some(note.text.clone().into()));
    set.insert(
        fields::NOTE_AUTHOR_INITIALS,
        Some(note.author_initials.clone().into()),
    );
    set.insert(
        fields::NOTE_AUTHOR_ROLE,
        author_role(note.author, role).map(|r| r.as_str().into()),
    );
    set.insert(fields::NOTE_UPDATED_AT, note.updated_at.map(epoch_secs));

    let streak = &snapshot.streak;
    set.insert(
        fields::STREAK_COUNT,
        Some(i64::from(streak.streak_count).into()),
    );
    set.insert(
        fields::LONGEST_STREAK,
        Some(i64::from(streak.longest_streak).into()),
    );
    set.insert(fields::LAST_NOTE_AT, streak.last_note_at.map(epoch_secs));

    set
}

/// Changes that release the partner slot: the claim and every partner
/// profile field are removed.
pub fn partner_release_fields() -> FieldSet {
    [
        fields::PARTNER_APPLE_ID,
        PARTNER.name,
        PARTNER.initials,
        PARTNER.city_label,
        PARTNER.country,
        PARTNER.lat,
        PARTNER.lon,
    ]
    .into_iter()
    .map(|name| (name, None))
    .collect()
}

fn insert_profile(set: &mut FieldSet, keys: &ProfileFields, profile: &Profile) {
    set.insert(keys.name, Some(profile.name.clone().into()));
    set.insert(keys.initials, Some(profile.initials.clone().into()));
    set.insert(keys.city_label, profile.city_label.clone().map(FieldValue::from));
    set.insert(keys.country, profile.country.clone().map(FieldValue::from));
    set.insert(keys.lat, profile.lat.map(FieldValue::from));
    set.insert(keys.lon, profile.lon.map(FieldValue::from));
}

fn epoch_secs(at: DateTime<Utc>) -> FieldValue {
    FieldValue::Double(at.timestamp_millis() as f64 / 1000.0)
}

/// Role of the note's author, from the writer's point of view.
fn author_role(author: NoteAuthor, writer: CoupleRole) -> Option<CoupleRole> {
    match author {
        NoteAuthor::Me => Some(writer),
        NoteAuthor::Partner => writer.counterpart(),
        NoteAuthor::Unknown => None,
    }
    .filter(CoupleRole::is_member)
}

// ── Record → snapshot ────────────────────────────────────────────

/// Maps a record back into a snapshot for a reader with `role`.
///
/// Profiles whose remote name is empty keep the local value. Countdown,
/// note and streak are taken from the record wholesale. Couple state and
/// `last_write_at` come from `current`.
pub fn snapshot_from_record(record: &RemoteRecord, role: CoupleRole, current: &Snapshot) -> Snapshot {
    let owner = profile_from(record, &OWNER);
    let partner = profile_from(record, &PARTNER);
    let (mine, theirs) = match role {
        CoupleRole::Partner => (partner, owner),
        CoupleRole::Owner | CoupleRole::None => (owner, partner),
    };
    let keep_named = |remote: Profile, local: &Profile| {
        if remote.name.is_empty() {
            local.clone()
        } else {
            remote
        }
    };

    let countdown = Countdown {
        event_at: instant(record, fields::EVENT_AT),
        label: record.get_str(fields::COUNTDOWN_LABEL).map(str::to_string),
    };

    let note = Note {
        text: record.get_str(fields::NOTE_TEXT).unwrap_or_default().to_string(),
        author_initials: record
            .get_str(fields::NOTE_AUTHOR_INITIALS)
            .unwrap_or(UNKNOWN_INITIALS)
            .to_string(),
        author: note_author(record, role),
        updated_at: instant(record, fields::NOTE_UPDATED_AT),
    };

    let streak = Streak {
        streak_count: count(record, fields::STREAK_COUNT),
        longest_streak: count(record, fields::LONGEST_STREAK),
        last_note_at: instant(record, fields::LAST_NOTE_AT),
    };

    Snapshot {
        couple: current.couple.clone(),
        me: keep_named(mine, &current.me),
        partner: keep_named(theirs, &current.partner),
        countdown,
        note,
        streak,
        last_write_at: current.last_write_at,
    }
}

fn profile_from(record: &RemoteRecord, keys: &ProfileFields) -> Profile {
    Profile {
        name: record.get_str(keys.name).unwrap_or_default().to_string(),
        initials: record
            .get_str(keys.initials)
            .unwrap_or(UNKNOWN_INITIALS)
            .to_string(),
        city_label: record.get_str(keys.city_label).map(str::to_string),
        country: record.get_str(keys.country).map(str::to_string),
        lat: record.get_f64(keys.lat),
        lon: record.get_f64(keys.lon),
    }
}

fn instant(record: &RemoteRecord, name: &str) -> Option<DateTime<Utc>> {
    let secs = record.get_f64(name)?;
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

fn count(record: &RemoteRecord, name: &str) -> u32 {
    record
        .get_i64(name)
        .unwrap_or(1)
        .clamp(1, i64::from(u32::MAX)) as u32
}

fn note_author(record: &RemoteRecord, reader: CoupleRole) -> NoteAuthor {
    let Some(author) = record
        .get_str(fields::NOTE_AUTHOR_ROLE)
        .and_then(|raw| raw.parse::<CoupleRole>().ok())
        .filter(CoupleRole::is_member)
    else {
        return NoteAuthor::Unknown;
    };
    if author == reader {
        NoteAuthor::Me
    } else {
        NoteAuthor::Partner
    }
}
