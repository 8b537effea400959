//! Store administration: connection check, seeding, wipe

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::Ready;
use crate::http::response::{Envelope, Success};
use crate::http::server::AppState;
use crate::seed::{seed_database, SeedReport};

/// Connection details reported by `/dbConnected`
#[derive(Serialize)]
pub struct DbStatus {
    pub success: &'static str,
    pub url: String,
    pub collections: Vec<String>,
}

#[derive(Serialize)]
pub struct DbCreated {
    pub success: String,
    #[serde(flatten)]
    pub report: SeedReport,
}

/// GET /dbConnected - endpoint (credentials redacted) and collection names
async fn db_connected(
    _ready: Ready,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<DbStatus>>, ApiError> {
    let collections = state.manager.collection_names().await?;
    let url = state
        .manager
        .endpoint()
        .unwrap_or_else(|| state.database.redacted_url());

    Ok(Json(Envelope::ok(DbStatus {
        success: "Successfully connected to the DB.",
        url,
        collections,
    })))
}

/// GET /dbCreate - run the seed batch; partial failure is a warning
async fn db_create(
    _ready: Ready,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<DbCreated>>, ApiError> {
    let report = seed_database(&state.manager, &state.allocator).await?;

    let body = if report.is_complete() {
        Envelope::ok(DbCreated {
            success: format!("DB created with {} records", report.inserted.len()),
            report,
        })
    } else {
        tracing::warn!(failed = report.failures.len(), "DB create incomplete");
        Envelope::warning(DbCreated {
            success: format!(
                "DB created with {} records, {} failed",
                report.inserted.len(),
                report.failures.len()
            ),
            report,
        })
    };
    Ok(Json(body))
}

/// GET /dbDelete - drop every collection, counters included
async fn db_delete(
    _ready: Ready,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Success>>, ApiError> {
    state.manager.drop_all().await?;
    Ok(Json(Envelope::ok(Success::new("DB deleted successfully!"))))
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dbConnected", get(db_connected))
        .route("/dbCreate", get(db_create))
        .route("/dbDelete", get(db_delete))
}
