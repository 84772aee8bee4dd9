use couple_sync::record::fields;
use couple_sync::{
    FieldValue, FsRecordStore, FsRecordStoreConfig, PushOutcome, RecordStore, RemoteRecord,
    SyncConfig, SyncEngine, SyncError,
};
use couple_types::{CoupleRole, Identity, Snapshot};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn store_in(temp: &TempDir) -> FsRecordStore {
    FsRecordStore::new(FsRecordStoreConfig::new(temp.path().join("records")))
}

fn record(key: &str) -> RemoteRecord {
    let mut record = RemoteRecord::new(key, "Couple");
    record.set(fields::NOTE_TEXT, Some(FieldValue::from("hello")));
    record.set(fields::OWNER_LAT, Some(FieldValue::Double(52.52)));
    record.set(fields::STREAK_COUNT, Some(FieldValue::Int(3)));
    record
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_default() {
    let config = FsRecordStoreConfig::default();
    assert_eq!(config.extension, "json");
    assert_eq!(config.root, std::path::PathBuf::from("couple-records"));
}

#[test]
fn provider_name() {
    let temp = TempDir::new().unwrap();
    assert_eq!(store_in(&temp).provider_name(), "Directory");
}

// ── Lifecycle ───────────────────────────────────────────────────

#[tokio::test]
async fn fetch_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    assert!(store.fetch("ABCDEFGH").await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_fetch() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    let saved = record("ABCDEFGH");

    store.save(&saved).await.unwrap();

    let fetched = store.fetch("ABCDEFGH").await.unwrap().unwrap();
    assert_eq!(fetched, saved);
    assert!(temp.path().join("records").join("ABCDEFGH.json").exists());
}

#[tokio::test]
async fn save_replaces_whole_record() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store.save(&record("ABCDEFGH")).await.unwrap();

    let replacement = RemoteRecord::new("ABCDEFGH", "Couple");
    store.save(&replacement).await.unwrap();

    let fetched = store.fetch("ABCDEFGH").await.unwrap().unwrap();
    assert!(fetched.fields.is_empty());
}

#[tokio::test]
async fn save_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store.save(&record("ABCDEFGH")).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(temp.path().join("records"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["ABCDEFGH.json".to_string()]);
}

#[tokio::test]
async fn delete_reports_existence() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store.save(&record("ABCDEFGH")).await.unwrap();

    assert!(store.delete("ABCDEFGH").await.unwrap());
    assert!(!store.delete("ABCDEFGH").await.unwrap());
    assert!(store.fetch("ABCDEFGH").await.unwrap().is_none());
}

#[tokio::test]
async fn custom_extension() {
    let temp = TempDir::new().unwrap();
    let store = FsRecordStore::new(FsRecordStoreConfig {
        root: temp.path().to_path_buf(),
        extension: "rec".to_string(),
    });
    store.save(&record("WXYZ2345")).await.unwrap();
    assert!(temp.path().join("WXYZ2345.rec").exists());
}

// ── Invalid input ───────────────────────────────────────────────

#[tokio::test]
async fn rejects_path_like_keys() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    for key in ["", "../etc", "AB/CD", "ABCD-EFGH"] {
        let err = store.fetch(key).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidRecord { .. }));
    }
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let store = FsRecordStore::new(FsRecordStoreConfig::new(temp.path()));
    std::fs::write(temp.path().join("ABCDEFGH.json"), b"{ not json").unwrap();

    let err = store.fetch("ABCDEFGH").await.unwrap_err();
    assert!(matches!(err, SyncError::Serialization(_)));
}

#[tokio::test]
async fn mismatched_key_is_an_error() {
    let temp = TempDir::new().unwrap();
    let store = FsRecordStore::new(FsRecordStoreConfig::new(temp.path()));
    store.save(&record("ABCDEFGH")).await.unwrap();
    std::fs::rename(
        temp.path().join("ABCDEFGH.json"),
        temp.path().join("WXYZ2345.json"),
    )
    .unwrap();

    let err = store.fetch("WXYZ2345").await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidRecord { .. }));
}

// ── With the engine ─────────────────────────────────────────────

#[tokio::test]
async fn engine_round_trip_through_directory() {
    let temp = TempDir::new().unwrap();
    let engine = SyncEngine::new(Arc::new(store_in(&temp)), SyncConfig::default());

    let mut owner = Snapshot::default();
    owner.couple.role = CoupleRole::Owner;
    owner.couple.paired = true;
    owner.couple.invite_code = Some("ABCD-EFGH".into());
    owner.note.text = "from disk".into();
    let id = Identity::new("owner");

    assert_eq!(engine.push(&owner, Some(&id)).await, PushOutcome::Success);
    let pulled = engine.pull(CoupleRole::Owner, &owner, Some(&id)).await.unwrap();
    assert_eq!(pulled.note.text, "from disk");
}
