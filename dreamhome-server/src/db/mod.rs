//! Database layer - PostgreSQL document store
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no Arc<Mutex<Connection>>
//! - Counter increments are one upsert statement - no read-then-write
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod connector;
pub mod migrations;
pub mod pool;
pub mod store;

pub use connector::StoreConnector;
pub use pool::{create_pool, create_pool_with_options};
pub use store::PgStore;
