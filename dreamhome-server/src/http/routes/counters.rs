//! Counter diagnostics

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::Ready;
use crate::http::response::Envelope;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct CounterValue {
    pub key: String,
    /// Last id issued for this key
    pub value: i64,
}

/// GET /counters/{key} - current value without advancing it
async fn peek_counter(
    _ready: Ready,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Envelope<CounterValue>>, ApiError> {
    let value = state.allocator.peek(&key).await?;
    Ok(Json(Envelope::ok(CounterValue { key, value })))
}

/// Counter routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/counters/{key}", get(peek_counter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::testing::{app_state, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn peek_reports_without_advancing() {
        let (state, connector) = app_state(true).await;
        state.allocator.next("clientId").await.unwrap();
        state.allocator.next("clientId").await.unwrap();

        for _ in 0..2 {
            let (status, body) =
                get(router().with_state(state.clone()), "/counters/clientId").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["key"], "clientId");
            assert_eq!(body["value"], 2);
        }
        assert_eq!(connector.store().counter_value("clientId"), Some(2));
    }

    #[tokio::test]
    async fn unknown_counter_is_404() {
        let (state, _) = app_state(true).await;
        let (status, body) = get(router().with_state(state), "/counters/officeId").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["RC"], 2);
    }

    #[tokio::test]
    async fn malformed_key_is_400() {
        let (state, _) = app_state(true).await;
        let (status, _) = get(router().with_state(state), "/counters/bad.key").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
