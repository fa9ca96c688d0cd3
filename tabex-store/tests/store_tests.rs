use serde_json::json;
use tabex_model::Record;
use tabex_store::{MemoryRecordStore, Ready, RecordStore, SqliteRecordStore, StoreError, StoreFilter};

fn rec(value: serde_json::Value) -> Record {
    Record::from_value(value).unwrap()
}

fn bookings() -> Vec<Record> {
    vec![
        rec(json!({"id": "b1", "status": "Registered", "userId": "u1"})),
        rec(json!({"id": "b2", "status": "Done", "userId": "u2"})),
        rec(json!({"id": "b3", "status": "Registered", "userId": "u2"})),
        rec(json!({"id": "b4", "status": 7, "userId": "u1"})),
    ]
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().filter_map(|r| r.get_str("/id")).collect()
}

// ── StoreFilter ──────────────────────────────────────────────────

#[test]
fn empty_filter_matches_everything() {
    let f = StoreFilter::all();
    assert!(f.is_empty());
    assert!(f.matches(&rec(json!({}))));
}

#[test]
fn filter_requires_string_equality() {
    let f = StoreFilter::all().eq("status", "7");
    assert!(!f.matches(&rec(json!({"status": 7}))));
    assert!(f.matches(&rec(json!({"status": "7"}))));
    assert!(!f.matches(&rec(json!({"other": "7"}))));
}

// ── MemoryRecordStore ────────────────────────────────────────────

#[test]
fn memory_store_preserves_order_and_filters() {
    let store = MemoryRecordStore::new();
    store.insert_many("bookings", bookings()).unwrap();

    let all = store.find_all("bookings", &StoreFilter::all()).unwrap();
    assert_eq!(ids(&all), vec!["b1", "b2", "b3", "b4"]);

    let registered = store
        .find_all("bookings", &StoreFilter::all().eq("status", "Registered"))
        .unwrap();
    assert_eq!(ids(&registered), vec!["b1", "b3"]);
}

#[test]
fn memory_store_unknown_collection_is_empty() {
    let store = MemoryRecordStore::new();
    assert!(store.find_all("nothing", &StoreFilter::all()).unwrap().is_empty());
}

#[test]
fn memory_store_offline_refuses_ready() {
    let store = MemoryRecordStore::new();
    store.set_available(false);
    let err = Ready::acquire(&store).unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    store.set_available(true);
    assert!(Ready::acquire(&store).is_ok());
}

// ── SqliteRecordStore ────────────────────────────────────────────

#[test]
fn sqlite_round_trips_records_in_order() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    assert_eq!(store.insert_many("bookings", &bookings()).unwrap(), 4);
    store.insert("users", &rec(json!({"id": "u1"}))).unwrap();

    let all = store.find_all("bookings", &StoreFilter::all()).unwrap();
    assert_eq!(ids(&all), vec!["b1", "b2", "b3", "b4"]);
    assert_eq!(all[0], bookings()[0]);
    assert_eq!(store.count("users").unwrap(), 1);
}

#[test]
fn sqlite_pushdown_matches_memory_semantics() {
    let sqlite = SqliteRecordStore::open_in_memory().unwrap();
    sqlite.insert_many("bookings", &bookings()).unwrap();
    let memory = MemoryRecordStore::new();
    memory.insert_many("bookings", bookings()).unwrap();

    let filters = [
        StoreFilter::all().eq("status", "Registered"),
        StoreFilter::all().eq("status", "Registered").eq("userId", "u2"),
        StoreFilter::all().eq("status", "7"),
        StoreFilter::all().eq("missing", "x"),
    ];
    for filter in &filters {
        let a = sqlite.find_all("bookings", filter).unwrap();
        let b = memory.find_all("bookings", filter).unwrap();
        assert_eq!(ids(&a), ids(&b), "filter {filter:?}");
    }
}

#[test]
fn sqlite_file_store_connects_lazily_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    let store = SqliteRecordStore::new(&path);
    assert!(!path.exists());
    store.connect().unwrap();
    store.insert("products", &rec(json!({"id": "p1", "stock": 5}))).unwrap();
    drop(store);

    let reopened = SqliteRecordStore::new(&path);
    let ready = Ready::acquire(&reopened).unwrap();
    let products = ready.find_all("products", &StoreFilter::all()).unwrap();
    assert_eq!(ids(&products), vec!["p1"]);
}

#[test]
fn sqlite_unreachable_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("dir").join("records.db");
    let store = SqliteRecordStore::new(&path);

    match store.connect() {
        Err(StoreError::Unavailable(reason)) => {
            assert_eq!(reason, "database could not be opened");
            assert!(!reason.contains(&*dir.path().to_string_lossy()));
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
    // Still failing on retry, and reads report the same.
    assert!(matches!(
        store.find_all("products", &StoreFilter::all()),
        Err(StoreError::Unavailable(_))
    ));
}

#[test]
fn sqlite_retries_after_failed_connect() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("late");
    let store = SqliteRecordStore::new(sub.join("records.db"));

    assert!(store.connect().is_err());
    std::fs::create_dir_all(&sub).unwrap();
    assert!(store.connect().is_ok());
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn error_display() {
    let err = StoreError::Unavailable("down".into());
    assert!(err.to_string().contains("down"));
    let err = StoreError::Query("bad sql".into());
    assert!(format!("{err:?}").contains("Query"));
}
