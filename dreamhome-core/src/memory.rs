//! In-process document store
//!
//! Backs `memory://` URLs and the test suites. Counter increments take a
//! single mutex for the whole read-modify-write, which gives the same
//! atomicity contract as the database backend. Fault switches let tests
//! simulate conflicts, outages, stalled calls, and connect failures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{Connector, Document, DocumentStore, COUNTERS_COLLECTION};

#[derive(Default)]
struct MemoryData {
    counters: BTreeMap<String, i64>,
    collections: BTreeMap<String, Vec<Document>>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
    pending_conflicts: AtomicU32,
    unavailable: AtomicBool,
    stalled: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` increments fail with `AllocationConflict`.
    pub fn inject_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    /// While set, every operation fails with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// While set, every operation waits forever, like a request sent to a
    /// server that stopped answering.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Direct read for assertions, bypassing the connection manager.
    pub fn counter_value(&self, key: &str) -> Option<i64> {
        self.data().counters.get(key).copied()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.data().collections.get(collection).map_or(0, Vec::len)
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Common prelude of every operation.
    async fn round_trip(&self) -> StoreResult<()> {
        // Let other tasks interleave the way a network round trip would
        tokio::task::yield_now().await;
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check_available()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::StoreUnavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }

    fn take_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn endpoint(&self) -> String {
        "memory://".to_string()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.round_trip().await
    }

    async fn increment_counter(&self, key: &str, start: i64) -> StoreResult<i64> {
        self.round_trip().await?;
        if self.take_conflict() {
            return Err(StoreError::AllocationConflict {
                key: key.to_owned(),
                reason: "injected conflict".into(),
            });
        }

        let mut data = self.data();
        let value = match data.counters.get(key) {
            Some(current) => current
                .checked_add(1)
                .ok_or_else(|| StoreError::CounterExhausted {
                    key: key.to_owned(),
                })?,
            None => start,
        };
        data.counters.insert(key.to_owned(), value);
        Ok(value)
    }

    async fn read_counter(&self, key: &str) -> StoreResult<Option<i64>> {
        self.round_trip().await?;
        Ok(self.counter_value(key))
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.round_trip().await?;
        self.data()
            .collections
            .entry(collection.to_owned())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.round_trip().await?;
        Ok(self
            .data()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.round_trip().await?;
        let data = self.data();
        let mut names: Vec<String> = data.collections.keys().cloned().collect();
        if !data.counters.is_empty() {
            names.push(COUNTERS_COLLECTION.to_string());
        }
        names.sort();
        Ok(names)
    }

    async fn drop_all(&self) -> StoreResult<()> {
        self.round_trip().await?;
        let mut data = self.data();
        data.counters.clear();
        data.collections.clear();
        Ok(())
    }

    async fn close(&self) {}
}

/// Connector that always hands out the same [`MemoryStore`], so data
/// survives reconnects the way a database server's would.
#[derive(Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    failing_connects: AtomicU32,
    hang: AtomicBool,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// Make the next `count` connect attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.failing_connects.store(count, Ordering::SeqCst);
    }

    /// While set, connect attempts never complete.
    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, config: &DatabaseConfig) -> StoreResult<Arc<dyn DocumentStore>> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let refused = self
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(StoreError::ConnectFailed {
                endpoint: config.redacted_url(),
                reason: "connection refused".into(),
            });
        }
        Ok(self.store.clone())
    }
}
