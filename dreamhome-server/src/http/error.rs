//! API error types with IntoResponse
//!
//! Errors are converted to `{"RC": 2, "error": <kind>, "message": ...}`
//! bodies. Store unavailability maps to 503 so clients can tell it apart
//! from allocation and other server failures (500).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use dreamhome_core::StoreError;

use super::response::RC_ERROR;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Store call failed; status depends on the kind
    Store(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, message) = match &self {
            Self::Store(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // Log the actual error, return generic message
                tracing::error!(kind = e.kind(), "store error: {}", e);
                (e.kind(), "an internal error occurred".to_string())
            }
            Self::Store(e) => {
                if e.is_unavailable() {
                    tracing::warn!(kind = e.kind(), "request rejected: {}", e);
                }
                (e.kind(), e.to_string())
            }
        };

        let body = json!({
            "RC": RC_ERROR,
            "error": kind,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_connected_is_503() {
        let response = ApiError::Store(StoreError::NotConnected).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["RC"], 2);
        assert_eq!(body["error"], "not_connected");
    }

    #[tokio::test]
    async fn allocation_conflict_is_500_and_distinguishable() {
        let err = StoreError::AllocationConflict {
            key: "clientId".into(),
            reason: "deadlock".into(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "allocation_conflict");
        assert_eq!(body["message"], "an internal error occurred");
    }

    #[tokio::test]
    async fn missing_counter_is_404() {
        let err = StoreError::NotFound {
            resource: "counter",
            id: "officeId".into(),
        };
        assert_eq!(ApiError::from(err).status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_key_is_400() {
        let err = StoreError::InvalidKey("bad key".into());
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
    }
}
