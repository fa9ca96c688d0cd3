//! Record store adapters for the tabex export engine.
//!
//! The engine needs exactly one read operation, [`RecordStore::find_all`],
//! plus an explicit readiness step. Reads go through a [`Ready`] capability,
//! which can only be obtained by connecting first.
//!
//! # Implementations
//!
//! - [`MemoryRecordStore`]: collections in a `RwLock`, with an availability
//!   switch for exercising outage paths
//! - [`SqliteRecordStore`]: JSON documents in a single SQLite table, opened
//!   lazily and retried after a failed connect

mod error;
mod filter;
mod memory;
mod ready;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use filter::StoreFilter;
pub use memory::MemoryRecordStore;
pub use ready::Ready;
pub use sqlite::SqliteRecordStore;

use tabex_model::Record;

/// Uniform read access to named collections of records.
///
/// Implementations must be safe to share across concurrently running exports.
pub trait RecordStore: Send + Sync {
    /// Make sure the store is reachable, connecting if needed.
    ///
    /// Returns [`StoreError::Unavailable`] when it isn't. Calling this again
    /// after a failure retries the connection.
    fn connect(&self) -> StoreResult<()>;

    /// All records of `collection` that satisfy `filter`, in store order.
    ///
    /// Unknown collections are empty, not an error.
    fn find_all(&self, collection: &str, filter: &StoreFilter) -> StoreResult<Vec<Record>>;
}
