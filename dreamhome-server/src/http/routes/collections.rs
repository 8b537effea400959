//! Read-only listings of the sample collections

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use dreamhome_core::Document;

use crate::http::error::ApiError;
use crate::http::extractors::Ready;
use crate::http::response::{Envelope, Items};
use crate::http::server::AppState;
use crate::models::Collection;

type Listing = Result<Json<Envelope<Items<Document>>>, ApiError>;

async fn list(state: &AppState, collection: Collection) -> Listing {
    let items = state
        .manager
        .collection(collection.name())
        .find_all()
        .await?;
    tracing::debug!(%collection, count = items.len(), "listed collection");
    Ok(Json(Envelope::ok(Items { items })))
}

/// GET /clients
async fn list_clients(_ready: Ready, State(state): State<Arc<AppState>>) -> Listing {
    list(&state, Collection::Clients).await
}

/// GET /agents
async fn list_agents(_ready: Ready, State(state): State<Arc<AppState>>) -> Listing {
    list(&state, Collection::Agents).await
}

/// GET /offices
async fn list_offices(_ready: Ready, State(state): State<Arc<AppState>>) -> Listing {
    list(&state, Collection::Offices).await
}

/// GET /properties
async fn list_properties(_ready: Ready, State(state): State<Arc<AppState>>) -> Listing {
    list(&state, Collection::Properties).await
}

/// GET /notifications
async fn list_notifications(_ready: Ready, State(state): State<Arc<AppState>>) -> Listing {
    list(&state, Collection::Notifications).await
}

/// Collection routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clients", get(list_clients))
        .route("/agents", get(list_agents))
        .route("/offices", get(list_offices))
        .route("/properties", get(list_properties))
        .route("/notifications", get(list_notifications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::testing::{app_state, get};
    use crate::seed::seed_database;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn empty_collection_lists_nothing() {
        let (state, _) = app_state(true).await;
        let (status, body) = get(router().with_state(state), "/clients").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["RC"], 0);
        assert!(body["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_seeded_documents() {
        let (state, _) = app_state(true).await;
        seed_database(&state.manager, &state.allocator)
            .await
            .unwrap();

        let (_, body) = get(router().with_state(state.clone()), "/properties").await;
        let mut ids: Vec<i64> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["propertyId"].as_i64())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);

        let (_, body) = get(router().with_state(state), "/agents").await;
        assert_eq!(body["items"][0]["agentData"]["agentFN"], "Dinesh");
    }

    #[tokio::test]
    async fn listing_while_disconnected_is_503() {
        let (state, _) = app_state(false).await;
        for collection in Collection::ALL {
            let uri = format!("/{}", collection.name());
            let (status, body) = get(router().with_state(state.clone()), &uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            assert_eq!(body["error"], "not_connected");
        }
    }

    #[tokio::test]
    async fn outage_mid_request_demotes_state() {
        let (state, connector) = app_state(true).await;
        connector.store().set_unavailable(true);

        let (status, body) = get(router().with_state(state.clone()), "/offices").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_unavailable");
        assert!(!state.manager.state().is_connected());
    }
}
