//! Full router: routes, readiness gate, and the static fallback together.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use dreamhome_core::{ConnectionManager, CounterAllocator, DatabaseConfig, MemoryConnector};
use dreamhome_server::http::build_router;
use dreamhome_server::{AppState, ServerConfig};

struct TestApp {
    router: Router,
    manager: ConnectionManager,
    connector: Arc<MemoryConnector>,
    _static_dir: tempfile::TempDir,
}

fn app() -> TestApp {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>DreamHome</h1>").unwrap();

    let connector = Arc::new(MemoryConnector::new());
    let manager = ConnectionManager::new(connector.clone());
    let allocator = CounterAllocator::new(manager.clone());
    let state = Arc::new(AppState::new(
        manager.clone(),
        allocator,
        DatabaseConfig::with_url("memory://"),
    ));
    let config = ServerConfig {
        static_dir: static_dir.path().to_path_buf(),
        ..ServerConfig::default()
    };

    TestApp {
        router: build_router(state, &config),
        manager,
        connector,
        _static_dir: static_dir,
    }
}

async fn send(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(router, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn store_routes_wait_for_the_connection() {
    let app = app();

    let (status, _) = send_json(&app.router, "/clients").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Liveness answers regardless
    let (status, body) = send_json(&app.router, "/echo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["RC"], 0);

    app.manager
        .connect_and_wait(DatabaseConfig::with_url("memory://"))
        .await
        .unwrap();
    let (status, body) = send_json(&app.router, "/clients").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], serde_json::json!([]));
}

#[tokio::test]
async fn seed_flow_over_http() {
    let app = app();
    app.manager
        .connect_and_wait(DatabaseConfig::with_url("memory://"))
        .await
        .unwrap();

    let (status, _) = send_json(&app.router, "/dbCreate").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app.router, "/counters/propertyId").await;
    assert_eq!(body["value"], 3);

    let (_, body) = send_json(&app.router, "/notifications").await;
    assert_eq!(body["items"][0]["notificationId"], 1);

    send_json(&app.router, "/dbDelete").await;
    assert_eq!(app.connector.store().counter_value("propertyId"), None);

    let (status, _) = send_json(&app.router, "/counters/propertyId").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_paths_fall_back_to_static_files() {
    let app = app();

    let (status, body) = send(&app.router, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>DreamHome</h1>");

    let (status, _) = send(&app.router, "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
