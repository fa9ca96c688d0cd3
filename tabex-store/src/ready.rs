use tracing::warn;

use crate::{RecordStore, StoreFilter, StoreResult};
use tabex_model::Record;

/// Proof that a store answered [`RecordStore::connect`] successfully.
///
/// Holding a `Ready` is the only way the export engine reads records.
#[derive(Clone, Copy)]
pub struct Ready<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> Ready<'a> {
    /// Connect `store` and hand back the read capability.
    pub fn acquire(store: &'a dyn RecordStore) -> StoreResult<Self> {
        if let Err(err) = store.connect() {
            warn!(error = %err, "Record store not ready");
            return Err(err);
        }
        Ok(Self { store })
    }

    pub fn find_all(&self, collection: &str, filter: &StoreFilter) -> StoreResult<Vec<Record>> {
        self.store.find_all(collection, filter)
    }
}

impl std::fmt::Debug for Ready<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ready").finish_non_exhaustive()
    }
}
