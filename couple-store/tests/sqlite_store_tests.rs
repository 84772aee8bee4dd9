use chrono::{DateTime, Duration, TimeZone, Utc};
use couple_store::{LocalStateStore, SqliteStateStore};
use couple_types::{CoupleRole, Entitlement, NoteAuthor, Snapshot};
use pretty_assertions::assert_eq;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn paired_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::default();
    snapshot.couple.role = CoupleRole::Owner;
    snapshot.couple.paired = true;
    snapshot.couple.invite_code = Some("ABCD-EFGH".into());
    snapshot.me.set_name("Lena Sommer", "A");
    snapshot.me.set_location(Some("Berlin".into()), Some("Deutschland".into()), Some((52.52, 13.405)));
    snapshot.partner.set_name("Jonas", "B");
    snapshot.partner.set_location(Some("New York City".into()), Some("USA".into()), Some((40.7128, -74.006)));
    snapshot.countdown.event_at = Some(at(1_800_000_000));
    snapshot.countdown.label = Some("Reunion".into());
    snapshot.note.text = "miss you".into();
    snapshot.note.author_initials = "LS".into();
    snapshot.note.author = NoteAuthor::Me;
    snapshot.note.updated_at = Some(at(1_700_000_000));
    snapshot.streak.streak_count = 4;
    snapshot.streak.longest_streak = 9;
    snapshot.streak.last_note_at = Some(at(1_700_000_000));
    snapshot
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn fresh_store_reads_defaults() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let snapshot = store.read();

    assert_eq!(snapshot.couple.role, CoupleRole::None);
    assert_eq!(snapshot.couple.entitlement, Entitlement::Unlocked);
    assert!(!snapshot.couple.paired);
    assert_eq!(snapshot.couple.invite_code, None);
    assert_eq!(snapshot.me.name, "Me");
    assert_eq!(snapshot.me.initials, "A");
    assert_eq!(snapshot.partner.name, "Partner");
    assert_eq!(snapshot.partner.initials, "B");
    assert_eq!(snapshot.note.author, NoteAuthor::Me);
    assert_eq!(snapshot.streak.streak_count, 1);
    assert!(snapshot.last_write_at.is_some());
}

#[test]
fn defaults_are_seeded_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let store = SqliteStateStore::open(&path).unwrap();
        store.write(&paired_snapshot(), at(1_700_000_100)).unwrap();
    }

    let reopened = SqliteStateStore::open(&path).unwrap();
    let snapshot = reopened.read();
    assert_eq!(snapshot.couple.role, CoupleRole::Owner);
    assert_eq!(snapshot.me.name, "Lena Sommer");
}

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn write_then_read_roundtrip() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let now = at(1_700_000_100);
    let snapshot = paired_snapshot();

    store.write(&snapshot, now).unwrap();
    let read = store.read();

    let expected = Snapshot {
        last_write_at: Some(now),
        ..snapshot
    };
    assert_eq!(read, expected);
}

#[test]
fn unknown_note_author_survives() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let mut snapshot = paired_snapshot();
    snapshot.note.author = NoteAuthor::Unknown;

    store.write(&snapshot, at(0)).unwrap();
    assert_eq!(store.read().note.author, NoteAuthor::Unknown);
}

// ── Write normalization ──────────────────────────────────────────

#[test]
fn coordinates_without_label_are_dropped() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let mut snapshot = Snapshot::default();
    snapshot.me.set_location(None, Some("  ".into()), Some((1.0, 2.0)));

    store.write(&snapshot, at(0)).unwrap();
    let read = store.read();
    assert_eq!(read.me.city_label, None);
    assert_eq!(read.me.country, None);
    assert_eq!(read.me.lat, None);
    assert_eq!(read.me.lon, None);
}

#[test]
fn countdown_label_is_trimmed_and_clipped() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let mut snapshot = Snapshot::default();
    snapshot.countdown.label = Some("  Wiedersehen in Wien  ".into());

    store.write(&snapshot, at(0)).unwrap();
    assert_eq!(store.read().countdown.label.as_deref(), Some("Wiedersehen "));

    snapshot.countdown.label = Some("   ".into());
    store.write(&snapshot, at(0)).unwrap();
    assert_eq!(store.read().countdown.label, None);
}

#[test]
fn empty_invite_code_is_removed() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let mut snapshot = paired_snapshot();
    store.write(&snapshot, at(0)).unwrap();

    snapshot.couple.invite_code = Some(String::new());
    store.write(&snapshot, at(0)).unwrap();
    assert_eq!(store.read().couple.invite_code, None);
}

// ── Display cache ────────────────────────────────────────────────

#[test]
fn display_cache_tracks_last_write() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let now = at(1_700_000_000);
    let mut snapshot = paired_snapshot();
    snapshot.countdown.event_at = Some(now + Duration::minutes(30));

    store.write(&snapshot, now).unwrap();
    let cache = store.display_cache().unwrap();
    assert_eq!(cache.distance_label, "LS ↔ J");
    assert_eq!(cache.countdown_display, "30 min");
    assert!(cache.distance_km > 1000);
}

#[test]
fn display_cache_without_locations() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    let cache = store.display_cache().unwrap();
    assert_eq!(cache.distance_km, 0);
    assert_eq!(cache.distance_label, "A ↔ B");
    assert_eq!(cache.countdown_display, "Set date");
}

// ── Pending delete marker ────────────────────────────────────────

#[test]
fn pending_delete_lifecycle() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    assert_eq!(store.pending_delete(), None);

    store.set_pending_delete(Some("ABCD-EFGH")).unwrap();
    assert_eq!(store.pending_delete().as_deref(), Some("ABCD-EFGH"));

    store.set_pending_delete(None).unwrap();
    assert_eq!(store.pending_delete(), None);

    store.set_pending_delete(Some("")).unwrap();
    assert_eq!(store.pending_delete(), None);
}

#[test]
fn pending_delete_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    SqliteStateStore::open(&path)
        .unwrap()
        .set_pending_delete(Some("WXYZ-2345"))
        .unwrap();

    let reopened = SqliteStateStore::open(&path).unwrap();
    assert_eq!(reopened.pending_delete().as_deref(), Some("WXYZ-2345"));
}

#[test]
fn pending_delete_is_independent_of_snapshot_writes() {
    let store = SqliteStateStore::open_in_memory().unwrap();
    store.set_pending_delete(Some("ABCD-EFGH")).unwrap();
    store.write(&Snapshot::default(), at(0)).unwrap();
    assert_eq!(store.pending_delete().as_deref(), Some("ABCD-EFGH"));
}
