//! SQLite-backed [`LocalStateStore`].
//!
//! Values live in a single key/value table with SQLite's dynamic typing:
//! strings as TEXT, coordinates as REAL, flags and counters as INTEGER and
//! instants as INTEGER epoch milliseconds. A missing row means "unset".

use crate::keys::{self, ProfileKeys};
use crate::{DisplayCache, LocalStateStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use couple_display::{countdown_text, distance_km};
use couple_types::{
    Countdown, CoupleRole, CoupleState, Entitlement, Note, NoteAuthor, Profile, Snapshot, Streak,
};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Persistent snapshot store backed by SQLite.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Opens (or creates) a store at the given path and seeds defaults on
    /// first use.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        store.ensure_defaults(Utc::now())?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Writes the default snapshot unless the store was initialized before.
    pub fn ensure_defaults(&self, now: DateTime<Utc>) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if get(&tx, keys::HAS_INITIALIZED)?.is_some() {
            return Ok(());
        }
        set(&tx, keys::HAS_INITIALIZED, Value::Integer(1))?;
        write_snapshot(&tx, &Snapshot::default(), now)?;
        tx.commit()?;
        debug!("Initialized local state store with defaults");
        Ok(())
    }

    fn load_all(&self) -> StoreResult<Values> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?))
        })?;
        let map = rows.collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Values(map))
    }
}

impl LocalStateStore for SqliteStateStore {
    fn read(&self) -> Snapshot {
        match self.load_all() {
            Ok(values) => values.snapshot(),
            Err(e) => {
                warn!("Failed to read local state, using defaults: {e}");
                Snapshot::default()
            }
        }
    }

    fn write(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_snapshot(&tx, snapshot, now)?;
        tx.commit()?;
        Ok(())
    }

    fn set_pending_delete(&self, code: Option<&str>) -> StoreResult<()> {
        let conn = self.lock()?;
        set_text(&conn, keys::PENDING_DELETE_INVITE_CODE, code)
    }

    fn pending_delete(&self) -> Option<String> {
        let value = self
            .lock()
            .and_then(|conn| get(&conn, keys::PENDING_DELETE_INVITE_CODE));
        match value {
            Ok(Some(Value::Text(code))) if !code.is_empty() => Some(code),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read pending delete marker: {e}");
                None
            }
        }
    }

    fn display_cache(&self) -> Option<DisplayCache> {
        let values = match self.load_all() {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to read display cache: {e}");
                return None;
            }
        };
        Some(DisplayCache {
            distance_km: values.int(keys::DISTANCE_KM).unwrap_or(0).clamp(0, u32::MAX as i64) as u32,
            distance_label: values.text(keys::DISTANCE_LABEL)?,
            countdown_display: values.text(keys::COUNTDOWN_DISPLAY)?,
        })
    }
}

// ── Writing ──────────────────────────────────────────────────────

fn write_snapshot(conn: &Connection, snapshot: &Snapshot, now: DateTime<Utc>) -> StoreResult<()> {
    let snapshot = &snapshot.normalized();
    let couple = &snapshot.couple;
    set(conn, keys::PAIRED, Value::Integer(couple.paired.into()))?;
    set(conn, keys::ROLE, Value::Text(couple.role.as_str().into()))?;
    set(conn, keys::ENTITLEMENT, Value::Text(couple.entitlement.as_str().into()))?;
    set_text(conn, keys::INVITE_CODE, couple.active_code())?;

    write_profile(conn, &keys::ME, &snapshot.me)?;
    write_profile(conn, &keys::PARTNER, &snapshot.partner)?;

    let countdown = &snapshot.countdown;
    set_instant(conn, keys::EVENT_AT, countdown.event_at)?;
    set_text(conn, keys::COUNTDOWN_LABEL, countdown.label.as_deref())?;
    set(
        conn,
        keys::COUNTDOWN_DISPLAY,
        Value::Text(countdown_text(countdown.event_at, now)),
    )?;

    let note = &snapshot.note;
    set(conn, keys::NOTE_TEXT, Value::Text(note.text.clone()))?;
    set(conn, keys::NOTE_AUTHOR_INITIALS, Value::Text(note.author_initials.clone()))?;
    let author = (note.author != NoteAuthor::Unknown).then(|| note.author.as_str());
    set_text(conn, keys::NOTE_AUTHOR, author)?;
    set_instant(conn, keys::NOTE_UPDATED_AT, note.updated_at)?;

    let streak = &snapshot.streak;
    set(conn, keys::STREAK_COUNT, Value::Integer(streak.streak_count.into()))?;
    set(conn, keys::LONGEST_STREAK, Value::Integer(streak.longest_streak.into()))?;
    set_instant(conn, keys::LAST_NOTE_AT, streak.last_note_at)?;

    set(conn, keys::DISTANCE_LABEL, Value::Text(snapshot.pair_label()))?;
    let km = distance_km(&snapshot.me, &snapshot.partner).unwrap_or(0);
    set(conn, keys::DISTANCE_KM, Value::Integer(km.into()))?;

    set(conn, keys::LAST_WRITE_AT, Value::Integer(now.timestamp_millis()))?;
    Ok(())
}

fn write_profile(conn: &Connection, keys: &ProfileKeys, profile: &Profile) -> StoreResult<()> {
    set(conn, keys.name, Value::Text(profile.name.clone()))?;
    set(conn, keys.initials, Value::Text(profile.initials.clone()))?;
    set_text(conn, keys.city_label, profile.city_label.as_deref())?;
    set_text(conn, keys.country, profile.country.as_deref())?;
    set_real(conn, keys.lat, profile.lat)?;
    set_real(conn, keys.lon, profile.lon)?;
    Ok(())
}

fn get(conn: &Connection, key: &str) -> StoreResult<Option<Value>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, Value>(0)
        })
        .optional()?;
    Ok(value)
}

fn set(conn: &Connection, key: &str, value: Value) -> StoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

fn remove(conn: &Connection, key: &str) -> StoreResult<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
    Ok(())
}

/// Stores non-empty text, removes the key otherwise.
fn set_text(conn: &Connection, key: &str, value: Option<&str>) -> StoreResult<()> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => set(conn, key, Value::Text(v.to_string())),
        None => remove(conn, key),
    }
}

fn set_real(conn: &Connection, key: &str, value: Option<f64>) -> StoreResult<()> {
    match value {
        Some(v) => set(conn, key, Value::Real(v)),
        None => remove(conn, key),
    }
}

fn set_instant(conn: &Connection, key: &str, value: Option<DateTime<Utc>>) -> StoreResult<()> {
    match value {
        Some(at) => set(conn, key, Value::Integer(at.timestamp_millis())),
        None => remove(conn, key),
    }
}

// ── Reading ──────────────────────────────────────────────────────

struct Values(HashMap<String, Value>);

impl Values {
    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(Value::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn real(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(Value::Real(v)) => Some(*v),
            Some(Value::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(Value::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.int(key).is_some_and(|v| v != 0)
    }

    fn instant(&self, key: &str) -> Option<DateTime<Utc>> {
        self.int(key).and_then(DateTime::from_timestamp_millis)
    }

    fn count(&self, key: &str) -> u32 {
        self.int(key).unwrap_or(1).clamp(1, u32::MAX as i64) as u32
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.text(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                let err = StoreError::InvalidData {
                    key: key.to_string(),
                    detail: raw,
                };
                warn!("Ignoring stored value: {err}");
                None
            }
        }
    }

    fn profile(&self, keys: &ProfileKeys, defaults: Profile) -> Profile {
        Profile {
            name: self.text(keys.name).unwrap_or(defaults.name),
            initials: self.text(keys.initials).unwrap_or(defaults.initials),
            city_label: self.text(keys.city_label),
            country: self.text(keys.country),
            lat: self.real(keys.lat),
            lon: self.real(keys.lon),
        }
    }

    fn snapshot(&self) -> Snapshot {
        let couple = CoupleState {
            role: self.parsed::<CoupleRole>(keys::ROLE).unwrap_or_default(),
            entitlement: self.parsed::<Entitlement>(keys::ENTITLEMENT).unwrap_or_default(),
            paired: self.flag(keys::PAIRED),
            invite_code: self.text(keys::INVITE_CODE),
        };

        let me = self.profile(&keys::ME, Profile::default_me());
        let partner = self.profile(&keys::PARTNER, Profile::default_partner());

        let countdown = Countdown {
            event_at: self.instant(keys::EVENT_AT),
            label: self.text(keys::COUNTDOWN_LABEL),
        };

        let note = Note {
            text: self.text(keys::NOTE_TEXT).unwrap_or_default(),
            author_initials: self
                .text(keys::NOTE_AUTHOR_INITIALS)
                .unwrap_or_else(|| me.initials.clone()),
            author: self.parsed::<NoteAuthor>(keys::NOTE_AUTHOR).unwrap_or(NoteAuthor::Unknown),
            updated_at: self.instant(keys::NOTE_UPDATED_AT),
        };

        let streak = Streak {
            streak_count: self.count(keys::STREAK_COUNT),
            longest_streak: self.count(keys::LONGEST_STREAK),
            last_note_at: self.instant(keys::LAST_NOTE_AT),
        };

        Snapshot {
            couple,
            me,
            partner,
            countdown,
            note,
            streak,
            last_write_at: self.instant(keys::LAST_WRITE_AT),
        }
    }
}
