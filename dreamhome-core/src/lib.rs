//! dreamhome-core: connection lifecycle and id allocation
//!
//! The two pieces every DreamHome request handler shares:
//! - [`ConnectionManager`] owns the single store connection and publishes its state
//! - [`CounterAllocator`] hands out per-key monotonic ids through that connection
//!
//! Storage backends plug in through [`Connector`] and [`DocumentStore`].
//! [`MemoryStore`] is the in-process backend used by tests and `memory://` URLs.

pub mod config;
pub mod connection;
pub mod counter;
pub mod error;
pub mod memory;
pub mod state;
pub mod store;

pub use config::{DatabaseConfig, DreamhomeConfig, ServerSettings};
pub use connection::{CollectionHandle, ConnectionManager, ReadySignal};
pub use counter::{CounterAllocator, CounterSettings};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryConnector, MemoryStore};
pub use state::ConnectionState;
pub use store::{Connector, Document, DocumentStore, COUNTERS_COLLECTION};
