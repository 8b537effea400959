//! Storage backend traits
//!
//! A backend is reached in two steps: a [`Connector`] performs the network
//! handshake and yields a [`DocumentStore`] bound to that connection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::StoreResult;

/// Name of the collection that holds counter records.
pub const COUNTERS_COLLECTION: &str = "counters";

/// A schemaless JSON document.
pub type Document = serde_json::Value;

/// Operations the core needs from a connected store.
///
/// `increment_counter` must be a single indivisible read-modify-write: the
/// record is created with `start` when absent, otherwise incremented by one,
/// and the resulting value is returned. No other call may observe or produce
/// the same value for the same key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Endpoint description with credentials removed.
    fn endpoint(&self) -> String;

    async fn ping(&self) -> StoreResult<()>;

    async fn increment_counter(&self, key: &str, start: i64) -> StoreResult<i64>;

    /// Current value of a counter, `None` when no record exists.
    async fn read_counter(&self, key: &str) -> StoreResult<Option<i64>>;

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()>;

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Names of non-empty collections, counters included.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Erase every document and every counter record.
    async fn drop_all(&self) -> StoreResult<()>;

    async fn close(&self);
}

/// Establishes a connection to a backend.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &DatabaseConfig) -> StoreResult<Arc<dyn DocumentStore>>;
}
