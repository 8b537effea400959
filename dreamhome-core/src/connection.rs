//! Connection manager - lifecycle of the single store connection
//!
//! State lives in a `watch` channel so [`ConnectionManager::state`] never
//! blocks and never observes a half-applied transition. The connection itself
//! is tagged with a generation number; handles and in-flight operations carry
//! the generation they started on, so results from a dropped connection can
//! never demote or resurrect a newer one.
//!
//! Every store call is bounded by the configured query timeout. A call that
//! runs out of time counts as `StoreUnavailable` and demotes the connection.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::state::ConnectionState;
use crate::store::{Connector, Document, DocumentStore};

#[derive(Clone)]
struct Session {
    generation: u64,
    store: Arc<dyn DocumentStore>,
    query_timeout: Duration,
}

#[derive(Clone, Default)]
struct Snapshot {
    state: ConnectionState,
    session: Option<Session>,
    last_error: Option<String>,
    /// Bumped by every connect attempt; a late attempt whose number no
    /// longer matches is discarded.
    attempt: u64,
}

struct Inner {
    connector: Arc<dyn Connector>,
    snapshot: watch::Sender<Snapshot>,
    generations: AtomicU64,
    handles: Mutex<HandleCache>,
}

#[derive(Default)]
struct HandleCache {
    generation: u64,
    handles: HashMap<String, CollectionHandle>,
}

/// Owns the store connection. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .finish()
    }
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                connector,
                snapshot,
                generations: AtomicU64::new(0),
                handles: Mutex::new(HandleCache::default()),
            }),
        }
    }

    /// Current state. Never blocks.
    pub fn state(&self) -> ConnectionState {
        self.inner.snapshot.borrow().state
    }

    /// Reason for the most recent failure or demotion, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.snapshot.borrow().last_error.clone()
    }

    /// Endpoint of the live connection, credentials removed.
    pub fn endpoint(&self) -> Option<String> {
        self.inner
            .snapshot
            .borrow()
            .session
            .as_ref()
            .map(|s| s.store.endpoint())
    }

    /// Start a connection attempt in the background.
    ///
    /// Returns immediately with a signal that resolves once the attempt
    /// concludes. Fails with `ConnectInProgress` if another attempt is running.
    /// When already connected, no attempt is made and the signal resolves at
    /// once. The attempt is abandoned and the state set to Failed after
    /// `config.connect_timeout()`.
    pub fn connect(&self, config: DatabaseConfig) -> StoreResult<ReadySignal> {
        let mut started = None;
        let mut observed = ConnectionState::Disconnected;
        self.inner.snapshot.send_if_modified(|snap| {
            observed = snap.state;
            match snap.state {
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    snap.state = ConnectionState::Connecting;
                    snap.session = None;
                    snap.attempt += 1;
                    started = Some(snap.attempt);
                    true
                }
                ConnectionState::Connecting | ConnectionState::Connected => false,
            }
        });

        let Some(attempt) = started else {
            return match observed {
                ConnectionState::Connecting => Err(StoreError::ConnectInProgress),
                _ => Ok(self.ready_signal()),
            };
        };

        let signal = self.ready_signal();
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let endpoint = config.redacted_url();
            let timeout = config.connect_timeout();
            info!(%endpoint, ?timeout, "connecting to document store");

            let outcome = tokio::time::timeout(timeout, inner.connector.connect(&config)).await;
            match outcome {
                Ok(Ok(store)) => inner.establish(attempt, store, config.query_timeout()).await,
                Ok(Err(e)) => inner.fail(attempt, e.to_string()),
                Err(_) => inner.fail(
                    attempt,
                    format!(
                        "connect to {} timed out after {}s",
                        endpoint,
                        timeout.as_secs()
                    ),
                ),
            }
        });
        Ok(signal)
    }

    /// Connect and wait for the attempt to conclude.
    pub async fn connect_and_wait(&self, config: DatabaseConfig) -> StoreResult<ConnectionState> {
        Ok(self.connect(config)?.wait().await)
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal {
            rx: self.inner.snapshot.subscribe(),
        }
    }

    /// Handle to a named collection.
    ///
    /// Handles are cached per connection. A handle taken while disconnected,
    /// or before a reconnect, fails every operation with `NotConnected`.
    pub fn collection(&self, name: &str) -> CollectionHandle {
        let generation = self
            .inner
            .snapshot
            .borrow()
            .session
            .as_ref()
            .map_or(0, |s| s.generation);

        let mut cache = self.inner.handle_cache();
        if cache.generation != generation {
            cache.generation = generation;
            cache.handles.clear();
        }
        cache
            .handles
            .entry(name.to_owned())
            .or_insert_with(|| CollectionHandle {
                name: Arc::from(name),
                generation,
                manager: Arc::downgrade(&self.inner),
            })
            .clone()
    }

    /// Names of the collections currently holding data.
    pub async fn collection_names(&self) -> StoreResult<Vec<String>> {
        self.call(|store| async move { store.list_collections().await })
            .await
    }

    /// Erase every collection and every counter record.
    pub async fn drop_all(&self) -> StoreResult<()> {
        self.call(|store| async move { store.drop_all().await })
            .await?;
        warn!("document store wiped");
        Ok(())
    }

    /// Round trip to the store. A failure or a timeout demotes the
    /// connection.
    pub async fn ping(&self) -> StoreResult<()> {
        self.call(|store| async move { store.ping().await }).await
    }

    /// Close the connection and move to Disconnected.
    ///
    /// An attempt still in progress is cancelled: its signal resolves to
    /// Disconnected and a store it opens later is closed, not adopted.
    pub async fn disconnect(&self) {
        let mut previous = None;
        self.inner.snapshot.send_if_modified(|snap| {
            previous = snap.session.take();
            match snap.state {
                ConnectionState::Connected => {
                    snap.state = ConnectionState::Disconnected;
                    true
                }
                ConnectionState::Connecting => {
                    snap.state = ConnectionState::Disconnected;
                    snap.last_error = Some("connect attempt cancelled".into());
                    true
                }
                _ => previous.is_some(),
            }
        });
        if let Some(session) = previous {
            info!(generation = session.generation, "disconnecting from document store");
            session.store.close().await;
        }
    }

    /// Record an external disconnect event without closing the store.
    pub fn mark_disconnected(&self, reason: impl Into<String>) {
        let generation = self
            .inner
            .snapshot
            .borrow()
            .session
            .as_ref()
            .map(|s| s.generation);
        if let Some(generation) = generation {
            self.inner.demote(generation, reason.into());
        }
    }

    /// Run `op` against the live store, bounded by the query timeout.
    ///
    /// Fails with `NotConnected` without calling `op` unless Connected.
    pub(crate) async fn call<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(Arc<dyn DocumentStore>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        self.inner.call(None, op).await
    }
}

impl Inner {
    fn handle_cache(&self) -> std::sync::MutexGuard<'_, HandleCache> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_for(&self, generation: Option<u64>) -> StoreResult<Session> {
        let snap = self.snapshot.borrow();
        match &snap.session {
            Some(session)
                if snap.state == ConnectionState::Connected
                    && generation.map_or(true, |g| g == session.generation) =>
            {
                Ok(session.clone())
            }
            _ => Err(StoreError::NotConnected),
        }
    }

    async fn call<T, F, Fut>(&self, generation: Option<u64>, op: F) -> StoreResult<T>
    where
        F: FnOnce(Arc<dyn DocumentStore>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let session = self.session_for(generation)?;
        let limit = session.query_timeout;
        let result = match tokio::time::timeout(limit, op(session.store)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::StoreUnavailable(format!(
                "store did not answer within {}ms",
                limit.as_millis()
            ))),
        };
        self.observe(session.generation, result)
    }

    fn observe<T>(&self, generation: u64, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(StoreError::StoreUnavailable(reason)) = &result {
            self.demote(generation, reason.clone());
        }
        result
    }

    async fn establish(
        &self,
        attempt: u64,
        store: Arc<dyn DocumentStore>,
        query_timeout: Duration,
    ) {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let endpoint = store.endpoint();
        let session = Session {
            generation,
            store: store.clone(),
            query_timeout,
        };

        let adopted = self.snapshot.send_if_modified(|snap| {
            if snap.state != ConnectionState::Connecting || snap.attempt != attempt {
                return false;
            }
            snap.state = ConnectionState::Connected;
            snap.session = Some(session);
            snap.last_error = None;
            true
        });

        if adopted {
            info!(%endpoint, generation, "connected to document store");
        } else {
            info!(%endpoint, attempt, "connect attempt was cancelled, closing");
            store.close().await;
        }
    }

    fn fail(&self, attempt: u64, reason: String) {
        let failed = self.snapshot.send_if_modified(|snap| {
            if snap.state != ConnectionState::Connecting || snap.attempt != attempt {
                return false;
            }
            snap.state = ConnectionState::Failed;
            snap.session = None;
            snap.last_error = Some(reason.clone());
            true
        });
        if failed {
            warn!(%reason, "document store connection failed");
        }
    }

    /// Connected -> Disconnected, only if `generation` is still the live one.
    fn demote(&self, generation: u64, reason: String) {
        let demoted = self.snapshot.send_if_modified(|snap| {
            let live = snap
                .session
                .as_ref()
                .is_some_and(|s| s.generation == generation);
            if live && snap.state == ConnectionState::Connected {
                snap.state = ConnectionState::Disconnected;
                snap.session = None;
                snap.last_error = Some(reason.clone());
                true
            } else {
                false
            }
        });
        if demoted {
            warn!(generation, %reason, "lost connection to document store");
        }
    }
}

/// Resolves when a connect attempt concludes.
pub struct ReadySignal {
    rx: watch::Receiver<Snapshot>,
}

impl ReadySignal {
    /// Wait for the attempt to settle and return the resulting state.
    pub async fn wait(mut self) -> ConnectionState {
        let state = match self.rx.wait_for(|snap| snap.state.is_settled()).await {
            Ok(snap) => snap.state,
            // Manager dropped mid-attempt
            Err(_) => ConnectionState::Failed,
        };
        state
    }
}

/// Reference to a named collection on one specific connection.
#[derive(Clone)]
pub struct CollectionHandle {
    name: Arc<str>,
    generation: u64,
    manager: Weak<Inner>,
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.name)
            .field("generation", &self.generation)
            .finish()
    }
}

impl CollectionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// False once the connection this handle was taken on is gone.
    pub fn is_live(&self) -> bool {
        self.manager
            .upgrade()
            .is_some_and(|inner| inner.session_for(Some(self.generation)).is_ok())
    }

    pub async fn insert(&self, document: Document) -> StoreResult<()> {
        let inner = self.resolve()?;
        let name = &self.name;
        inner
            .call(Some(self.generation), move |store| async move {
                store.insert(name, document).await
            })
            .await
    }

    pub async fn find_all(&self) -> StoreResult<Vec<Document>> {
        let inner = self.resolve()?;
        let name = &self.name;
        inner
            .call(Some(self.generation), |store| async move {
                store.find_all(name).await
            })
            .await
    }

    fn resolve(&self) -> StoreResult<Arc<Inner>> {
        self.manager.upgrade().ok_or(StoreError::NotConnected)
    }
}
