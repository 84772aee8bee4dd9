//! Key names of the persisted values.

pub const HAS_INITIALIZED: &str = "cg.hasInitialized";

pub const PAIRED: &str = "cg.paired";
pub const ROLE: &str = "cg.role";
pub const ENTITLEMENT: &str = "cg.entitlement";
pub const INVITE_CODE: &str = "cg.inviteCode";

pub const MY_NAME: &str = "cg.myName";
pub const MY_INITIALS: &str = "cg.myInitials";
pub const MY_CITY_LABEL: &str = "cg.myCityLabel";
pub const MY_COUNTRY: &str = "cg.myCountry";
pub const MY_LAT: &str = "cg.myLat";
pub const MY_LON: &str = "cg.myLon";

pub const PARTNER_NAME: &str = "cg.partnerName";
pub const PARTNER_INITIALS: &str = "cg.partnerInitials";
pub const PARTNER_CITY_LABEL: &str = "cg.partnerCityLabel";
pub const PARTNER_COUNTRY: &str = "cg.partnerCountry";
pub const PARTNER_LAT: &str = "cg.partnerLat";
pub const PARTNER_LON: &str = "cg.partnerLon";

pub const DISTANCE_KM: &str = "cg.distanceKm";
pub const DISTANCE_LABEL: &str = "cg.distanceLabel";

pub const EVENT_AT: &str = "cg.eventAtUTC";
pub const COUNTDOWN_LABEL: &str = "cg.countdownLabel";
pub const COUNTDOWN_DISPLAY: &str = "cg.countdownDisplay";

pub const NOTE_TEXT: &str = "cg.noteText";
pub const NOTE_AUTHOR_INITIALS: &str = "cg.noteAuthorInitials";
pub const NOTE_AUTHOR: &str = "cg.noteAuthor";
pub const NOTE_UPDATED_AT: &str = "cg.noteUpdatedAt";

pub const STREAK_COUNT: &str = "cg.streakCount";
pub const LONGEST_STREAK: &str = "cg.longestStreak";
pub const LAST_NOTE_AT: &str = "cg.lastNoteAt";

pub const LAST_WRITE_AT: &str = "cg.lastCacheWriteAt";

/// Invite code whose shared record must still be deleted.
pub const PENDING_DELETE_INVITE_CODE: &str = "cg.pendingDeleteInviteCode";

/// Keys of one profile, so both sides share the read/write code.
pub(crate) struct ProfileKeys {
    pub name: &'static str,
    pub initials: &'static str,
    pub city_label: &'static str,
    pub country: &'static str,
    pub lat: &'static str,
    pub lon: &'static str,
}

pub(crate) const ME: ProfileKeys = ProfileKeys {
    name: MY_NAME,
    initials: MY_INITIALS,
    city_label: MY_CITY_LABEL,
    country: MY_COUNTRY,
    lat: MY_LAT,
    lon: MY_LON,
};

pub(crate) const PARTNER: ProfileKeys = ProfileKeys {
    name: PARTNER_NAME,
    initials: PARTNER_INITIALS,
    city_label: PARTNER_CITY_LABEL,
    country: PARTNER_COUNTRY,
    lat: PARTNER_LAT,
    lon: PARTNER_LON,
};
