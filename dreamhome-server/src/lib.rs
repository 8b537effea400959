//! dreamhome-server: REST front-end over the DreamHome document store
//!
//! Wires the core connection manager and counter allocator to:
//! - a PostgreSQL-backed [`DocumentStore`](dreamhome_core::DocumentStore)
//! - the seed batch that populates the sample collections
//! - the axum HTTP surface of the legacy dhDatabase service

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod monitor;
pub mod seed;

pub use error::{ServerError, ServerResult};
pub use http::{run_server, AppState, ServerConfig};
