//! Route handlers organized by resource

pub mod admin;
pub mod collections;
pub mod counters;
pub mod health;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use dreamhome_core::{ConnectionManager, CounterAllocator, DatabaseConfig, MemoryConnector};

    use crate::http::server::AppState;

    /// State over a fresh in-memory store, connected or not.
    pub async fn app_state(connected: bool) -> (Arc<AppState>, Arc<MemoryConnector>) {
        let connector = Arc::new(MemoryConnector::new());
        let manager = ConnectionManager::new(connector.clone());
        let database = DatabaseConfig::with_url("memory://");
        if connected {
            manager.connect_and_wait(database.clone()).await.unwrap();
        }
        let allocator = CounterAllocator::new(manager.clone());
        (
            Arc::new(AppState::new(manager, allocator, database)),
            connector,
        )
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
