//! Liveness endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use dreamhome_core::ConnectionState;

use crate::http::response::{Envelope, Success};
use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: ConnectionState,
    pub uptime_secs: u64,
}

/// GET /health - always 200; the store state is informational
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.manager.state(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// GET /echo
async fn echo() -> Json<Envelope<Success>> {
    Json(Envelope::ok(Success::new(
        "Echo from DreamHome.dhDatabase service!",
    )))
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/echo", get(echo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::testing::{app_state, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn echo_needs_no_store() {
        let Json(body) = echo().await;
        assert_eq!(body.rc, 0);
        assert!(body.body.success.starts_with("Echo from DreamHome"));
    }

    #[tokio::test]
    async fn health_reports_state_while_disconnected() {
        let (state, _) = app_state(false).await;
        let (status, body) = get(router().with_state(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "disconnected");
    }

    #[tokio::test]
    async fn health_reports_connected() {
        let (state, _) = app_state(true).await;
        let (_, body) = get(router().with_state(state), "/health").await;
        assert_eq!(body["database"], "connected");
    }
}
