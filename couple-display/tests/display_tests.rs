use chrono::{DateTime, Duration, TimeZone, Utc};
use couple_display::{countdown_text, distance_km, haversine_km, Coordinates, DisplayState};
use couple_types::{NoteAuthor, Profile, Snapshot};
use pretty_assertions::assert_eq;

fn epoch(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

// ── countdown_text ───────────────────────────────────────────────

#[test]
fn no_event() {
    assert_eq!(countdown_text(None, epoch(0)), "Set date");
}

#[test]
fn exactly_24h_is_one_day() {
    let now = epoch(0);
    assert_eq!(countdown_text(Some(now + Duration::hours(24)), now), "1 days");
}

#[test]
fn hours_round_up() {
    let now = epoch(0);
    let event = now + Duration::hours(23) + Duration::minutes(1);
    assert_eq!(countdown_text(Some(event), now), "24 h");
}

#[test]
fn minutes_round_up() {
    let now = epoch(0);
    let event = now + Duration::minutes(59) + Duration::seconds(1);
    assert_eq!(countdown_text(Some(event), now), "60 min");
}

#[test]
fn past_event_is_zero_minutes() {
    let now = epoch(1000);
    assert_eq!(countdown_text(Some(now - Duration::seconds(5)), now), "0 min");
    assert_eq!(countdown_text(Some(now), now), "0 min");
}

#[test]
fn a_few_seconds_left_is_one_minute() {
    let now = epoch(0);
    assert_eq!(countdown_text(Some(now + Duration::seconds(3)), now), "1 min");
}

#[test]
fn next_calendar_day_counts_as_day() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
    let event = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
    assert_eq!(countdown_text(Some(event), now), "1 days");
}

#[test]
fn many_days() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let event = Utc.with_ymd_and_hms(2026, 3, 15, 7, 0, 0).unwrap();
    assert_eq!(countdown_text(Some(event), now), "14 days");
}

// ── distance ─────────────────────────────────────────────────────

const BERLIN: Coordinates = Coordinates::new(52.52, 13.405);
const NEW_YORK: Coordinates = Coordinates::new(40.7128, -74.0060);

#[test]
fn berlin_to_new_york_is_large() {
    let km = haversine_km(BERLIN, NEW_YORK);
    assert!(km > 1000);
    assert!((6300..=6450).contains(&km));
}

#[test]
fn distance_is_symmetric() {
    assert_eq!(haversine_km(BERLIN, NEW_YORK), haversine_km(NEW_YORK, BERLIN));
}

#[test]
fn same_point_is_zero() {
    assert_eq!(haversine_km(BERLIN, BERLIN), 0);
}

#[test]
fn profile_distance_needs_both_locations() {
    let mut me = Profile::default_me();
    let mut partner = Profile::default_partner();
    assert_eq!(distance_km(&me, &partner), None);

    me.set_location(Some("Berlin".into()), None, Some((52.52, 13.405)));
    assert_eq!(distance_km(&me, &partner), None);

    partner.set_location(Some("New York City".into()), None, Some((40.7128, -74.0060)));
    assert_eq!(distance_km(&me, &partner), Some(haversine_km(BERLIN, NEW_YORK)));
}

// ── DisplayState ─────────────────────────────────────────────────

#[test]
fn display_state_from_default_snapshot() {
    let state = DisplayState::from_snapshot(&Snapshot::default(), epoch(0));
    assert_eq!(state.pair_label, "A ↔ B");
    assert_eq!(state.distance_km, None);
    assert_eq!(state.countdown_title, "Countdown");
    assert_eq!(state.countdown_text, "Set date");
    assert_eq!(state.note_author_initials, "A");
    assert_eq!(state.streak_count, 1);
}

#[test]
fn display_state_resolves_partner_author() {
    let mut snapshot = Snapshot::default();
    snapshot.partner.set_name("Jonas Berg", "B");
    snapshot.note.text = "see you soon".into();
    snapshot.note.author = NoteAuthor::Partner;
    snapshot.note.author_initials = "J".into();

    let state = DisplayState::from_snapshot(&snapshot, epoch(0));
    assert_eq!(state.pair_label, "A ↔ JB");
    assert_eq!(state.note_text, "see you soon");
    assert_eq!(state.note_author_initials, "JB");
}
