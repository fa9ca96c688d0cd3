//! SQLite-backed record store.
//!
//! Every collection lives in one `records` table as JSON text, ordered by an
//! autoincrement sequence so reads come back in insertion order. Equality
//! pre-filters are pushed down through `json_extract`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{RecordStore, StoreError, StoreFilter, StoreResult};
use tabex_model::Record;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        data TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_collection ON records (collection, seq);
";

/// Persistent record store backed by SQLite.
///
/// File-backed stores connect lazily on first use. A failed connect leaves
/// the store disconnected and the next call tries again.
pub struct SqliteRecordStore {
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteRecordStore {
    /// A store for the database file at `path`. Nothing is opened yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            conn: Mutex::new(None),
        }
    }

    /// Opens an in-memory store (for testing). Connected immediately.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            warn!(error = %e, "Failed to open in-memory record store");
            StoreError::Unavailable("database could not be opened".into())
        })?;
        init_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Append a record to `collection`.
    pub fn insert(&self, collection: &str, record: &Record) -> StoreResult<()> {
        let data = serde_json::to_string(record)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (collection, data) VALUES (?1, ?2)",
                params![collection, data],
            )?;
            Ok(())
        })
    }

    /// Append several records to `collection` in one transaction.
    pub fn insert_many(&self, collection: &str, records: &[Record]) -> StoreResult<usize> {
        let encoded = records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("INSERT INTO records (collection, data) VALUES (?1, ?2)")?;
                for data in &encoded {
                    stmt.execute(params![collection, data])?;
                }
            }
            tx.commit()?;
            Ok(encoded.len())
        })
    }

    /// Number of records stored in `collection`.
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(n).unwrap_or_default())
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.open()?);
        }
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(StoreError::Unavailable("no connection".into())),
        }
    }

    fn open(&self) -> StoreResult<Connection> {
        let Some(path) = &self.path else {
            return Err(StoreError::Unavailable("in-memory store was closed".into()));
        };
        let conn = Connection::open(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to open record store");
            StoreError::Unavailable("database could not be opened".into())
        })?;
        init_schema(&conn)?;
        info!(path = %path.display(), "Record store connected");
        Ok(conn)
    }
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RecordStore for SqliteRecordStore {
    fn connect(&self) -> StoreResult<()> {
        self.with_conn(|_| Ok(()))
    }

    fn find_all(&self, collection: &str, filter: &StoreFilter) -> StoreResult<Vec<Record>> {
        let mut sql = String::from("SELECT data FROM records WHERE collection = ?1");
        let mut args = vec![collection.to_string()];
        for (field, value) in filter.constraints() {
            sql.push_str(&format!(
                " AND json_extract(data, ?{}) = ?{}",
                args.len() + 1,
                args.len() + 2
            ));
            args.push(json_path(field));
            args.push(value.clone());
        }
        sql.push_str(" ORDER BY seq");
        debug!(collection, pushdown = filter.constraints().len(), "Querying records");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?;
            let mut records = Vec::new();
            for row in rows {
                let value: Value = serde_json::from_str(&row?)?;
                records.push(Record::from_value(value)?);
            }
            Ok(records)
        })
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA).map_err(|e| {
        warn!(error = %e, "Failed to initialize record schema");
        StoreError::Unavailable("database schema could not be initialized".into())
    })
}

fn json_path(field: &str) -> String {
    format!("$.\"{field}\"")
}
