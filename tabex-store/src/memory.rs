use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::{RecordStore, StoreError, StoreFilter, StoreResult};
use tabex_model::Record;

/// In-memory record store.
///
/// Collections keep insertion order. The availability switch makes the store
/// refuse connections, which is how tests exercise outage handling.
#[derive(Debug)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    available: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Append a record to `collection`.
    pub fn insert(&self, collection: &str, record: Record) -> StoreResult<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Query("collection lock poisoned".into()))?;
        collections.entry(collection.to_string()).or_default().push(record);
        Ok(())
    }

    /// Append several records to `collection`, in order.
    pub fn insert_many(&self, collection: &str, records: impl IntoIterator<Item = Record>) -> StoreResult<()> {
        for record in records {
            self.insert(collection, record)?;
        }
        Ok(())
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn connect(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".into()))
        }
    }

    fn find_all(&self, collection: &str, filter: &StoreFilter) -> StoreResult<Vec<Record>> {
        self.connect()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Query("collection lock poisoned".into()))?;
        Ok(collections
            .get(collection)
            .map(|records| records.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }
}
