//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dreamhome_core::StoreError;

use super::error::ApiError;
use super::server::AppState;

/// Readiness gate: rejects with 503 unless the store is connected.
///
/// Reads the connection state without waiting, so requests arriving during
/// startup or an outage get an immediate error instead of a timeout.
pub struct Ready;

impl FromRequestParts<Arc<AppState>> for Ready {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.manager.state().is_connected() {
            Ok(Self)
        } else {
            Err(ApiError::Store(StoreError::NotConnected))
        }
    }
}
